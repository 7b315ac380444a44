//! End-to-end node list scenarios, table driven in the manner of the
//! JSONPath compliance test suite.

use std::error::Error;

use jsonpath_select::{find, Query};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Deserialize)]
struct TestSuite {
    tests: Vec<Case>,
}

#[derive(Deserialize)]
struct Case {
    name: String,
    selector: String,

    #[serde(default)]
    document: Value,

    #[serde(default)]
    result: Vec<Value>,
}

const SUITE: &str = r#"{
  "tests": [
    {
      "name": "root alone selects the whole document",
      "selector": "$",
      "document": {"a": 1},
      "result": [{"a": 1}]
    },
    {
      "name": "member shorthand",
      "selector": "$.e",
      "document": {"a": [3, 5], "o": {"p": 1}, "e": "f"},
      "result": ["f"]
    },
    {
      "name": "absent member selects nothing",
      "selector": "$.nosuch",
      "document": {"a": 1},
      "result": []
    },
    {
      "name": "name selector on an array selects nothing",
      "selector": "$.a",
      "document": [1, 2, 3],
      "result": []
    },
    {
      "name": "index selector on an object selects nothing",
      "selector": "$[0]",
      "document": {"0": "zero"},
      "result": []
    },
    {
      "name": "negative index counts from the end",
      "selector": "$.a[-1]",
      "document": {"a": [3, 5, 1, 2, 4, 6, {"b": "j"}, {"b": "k"}, {"b": {}}, {"b": "kilo"}]},
      "result": [{"b": "kilo"}]
    },
    {
      "name": "out of range index selects nothing",
      "selector": "$.a[10]",
      "document": {"a": [3, 5]},
      "result": []
    },
    {
      "name": "out of range negative index selects nothing",
      "selector": "$.a[-3]",
      "document": {"a": [3, 5]},
      "result": []
    },
    {
      "name": "object wildcard visits members in sorted key order",
      "selector": "$.o.*",
      "document": {"o": {"p": 1, "t": {"u": 6}, "q": 2, "s": 5, "r": 3}},
      "result": [1, 2, 3, 5, {"u": 6}]
    },
    {
      "name": "wildcard on a scalar selects nothing",
      "selector": "$.e[*]",
      "document": {"e": "f"},
      "result": []
    },
    {
      "name": "filter comparing a member to a string literal",
      "selector": "$.a[?@.b == 'kilo']",
      "document": {"a": [3, 5, 1, 2, 4, 6, {"b": "j"}, {"b": "k"}, {"b": {}}, {"b": "kilo"}]},
      "result": [{"b": "kilo"}]
    },
    {
      "name": "filter with disjunction over current node and member",
      "selector": "$.a[?@ < 2 || @.b == \"k\"]",
      "document": {"a": [3, 5, 1, 2, 4, 6, {"b": "j"}, {"b": "k"}, {"b": {}}, {"b": "kilo"}]},
      "result": [1, {"b": "k"}]
    },
    {
      "name": "filter with match function is anchored",
      "selector": "$.a[?match(@.b, '[jk]')]",
      "document": {"a": [3, 5, 1, 2, 4, 6, {"b": "j"}, {"b": "k"}, {"b": {}}, {"b": "kilo"}]},
      "result": [{"b": "j"}, {"b": "k"}]
    },
    {
      "name": "filter with search function is unanchored",
      "selector": "$.a[?search(@.b, '[jk]')]",
      "document": {"a": [3, 5, 1, 2, 4, 6, {"b": "j"}, {"b": "k"}, {"b": {}}, {"b": "kilo"}]},
      "result": [{"b": "j"}, {"b": "k"}, {"b": "kilo"}]
    },
    {
      "name": "filter over object values in sorted key order",
      "selector": "$.o[?@ > 1 && @ < 4]",
      "document": {"o": {"p": 1, "q": 2, "r": 3, "s": 5, "t": {"u": 6}}},
      "result": [2, 3]
    },
    {
      "name": "missing compares equal to missing",
      "selector": "$.a[?@.b == $.x]",
      "document": {"a": [3, 5, 1, 2, 4, 6, {"b": "j"}, {"b": "k"}, {"b": {}}, {"b": "kilo"}]},
      "result": [3, 5, 1, 2, 4, 6]
    },
    {
      "name": "existence filter keeps members with null and false values",
      "selector": "$.a[?@.b]",
      "document": {"a": [3, {"b": "j"}, {"b": null}, {"b": false}, {"c": 1}]},
      "result": [{"b": "j"}, {"b": null}, {"b": false}]
    },
    {
      "name": "filter comparing against null literal",
      "selector": "$.a[?@.b == null]",
      "document": {"a": [{"b": null}, {"b": 1}, {"c": 2}]},
      "result": [{"b": null}]
    },
    {
      "name": "slice with start and stop",
      "selector": "$[1:3]",
      "document": ["a", "b", "c", "d", "e", "f", "g"],
      "result": ["b", "c"]
    },
    {
      "name": "slice with start only",
      "selector": "$[5:]",
      "document": ["a", "b", "c", "d", "e", "f", "g"],
      "result": ["f", "g"]
    },
    {
      "name": "slice with step",
      "selector": "$[1:5:2]",
      "document": ["a", "b", "c", "d", "e", "f", "g"],
      "result": ["b", "d"]
    },
    {
      "name": "slice with negative step",
      "selector": "$[5:1:-2]",
      "document": ["a", "b", "c", "d", "e", "f", "g"],
      "result": ["f", "d"]
    },
    {
      "name": "slice reversal",
      "selector": "$[::-1]",
      "document": ["a", "b", "c", "d", "e", "f", "g"],
      "result": ["g", "f", "e", "d", "c", "b", "a"]
    },
    {
      "name": "descendant name selector",
      "selector": "$..j",
      "document": {"o": {"j": 1, "k": 2}, "a": [5, 3, [{"j": 4}, {"k": 6}]]},
      "result": [4, 1]
    },
    {
      "name": "descendant index selector",
      "selector": "$..[0]",
      "document": {"o": {"j": 1, "k": 2}, "a": [5, 3, [{"j": 4}, {"k": 6}]]},
      "result": [5, {"j": 4}]
    },
    {
      "name": "descendant segment applies each selector in turn",
      "selector": "$.a..[0, 1]",
      "document": {"o": {"j": 1, "k": 2}, "a": [5, 3, [{"j": 4}, {"k": 6}]]},
      "result": [5, {"j": 4}, 3, {"k": 6}]
    },
    {
      "name": "descendant wildcard shorthand",
      "selector": "$..*",
      "document": {"a": [1], "b": 2},
      "result": [[1], 1, 2]
    },
    {
      "name": "quoted names with spaces and dots",
      "selector": "$.o['j j']['k.k']",
      "document": {"o": {"j j": {"k.k": 3}}, "'": {"@": 2}},
      "result": [3]
    },
    {
      "name": "double quoted names with special characters",
      "selector": "$[\"'\"][\"@\"]",
      "document": {"o": {"j j": {"k.k": 3}}, "'": {"@": 2}},
      "result": [2]
    },
    {
      "name": "multiple selectors concatenate in list order",
      "selector": "$[0, 2, 0]",
      "document": ["a", "b", "c"],
      "result": ["a", "c", "a"]
    },
    {
      "name": "nested filter",
      "selector": "$[?@[?@ > 1]]",
      "document": [[1], [2], [{"a": 3}]],
      "result": [[2]]
    },
    {
      "name": "root query inside a nested filter binds the document root",
      "selector": "$.a[?@[?@ > $.n]]",
      "document": {"n": 1, "a": [[0], [2]]},
      "result": [[2]]
    },
    {
      "name": "count of child nodes",
      "selector": "$[?count(@.*) == 2]",
      "document": [{"a": 1, "b": 2}, {"a": 1}, [1, 2], []],
      "result": [{"a": 1, "b": 2}, [1, 2]]
    },
    {
      "name": "length of member string",
      "selector": "$[?length(@.a) == 2]",
      "document": [{"a": "ab"}, {"a": "abc"}, {"a": [8, 9]}, {"a": 7}],
      "result": [{"a": "ab"}, {"a": [8, 9]}]
    },
    {
      "name": "value of a singleton node list",
      "selector": "$[?value(@..b) == 2]",
      "document": [{"a": {"b": 2}}, {"c": {"b": 2}, "d": {"b": 2}}, {"b": 1}],
      "result": [{"a": {"b": 2}}]
    }
  ]
}"#;

#[test]
fn node_list_scenarios() -> Result<(), Box<dyn Error>> {
    let suite: TestSuite = serde_json::from_str(SUITE)?;

    for case in suite.tests {
        let nodes = find(&case.selector, &case.document)?;
        let values: Vec<Value> = nodes.into_iter().cloned().collect();
        assert_eq!(values, case.result, "{}: {}", case.name, case.selector);
    }

    Ok(())
}

#[test]
fn repeated_application_is_pure() -> Result<(), Box<dyn Error>> {
    let doc = json!({"a": [3, 5, 1, {"b": "k"}], "o": {"p": 1, "q": 2}});
    let query = Query::standard("$..[?@ > 1 || @.b == 'k']")?;

    let first = query.find(&doc);
    let second = query.find(&doc);
    assert_eq!(first, second);

    Ok(())
}

#[test]
fn reversing_a_reversed_array_restores_it() -> Result<(), Box<dyn Error>> {
    let doc = json!(["a", "b", "c", "d", "e", "f", "g"]);
    let query = Query::standard("$[::-1]")?;

    let reversed = Value::Array(query.find(&doc).into_iter().cloned().collect());
    let restored: Vec<Value> = query.find(&reversed).into_iter().cloned().collect();

    assert_eq!(&Value::Array(restored), &doc);
    Ok(())
}

#[test]
fn descendant_results_contain_child_results() -> Result<(), Box<dyn Error>> {
    let docs = vec![
        json!({"x": 1, "a": {"x": 2}, "b": [{"x": 3}, {"y": 4}]}),
        json!([{"x": [1, 2]}, {"x": {"x": null}}]),
        json!({"a": 1}),
        json!(42),
    ];

    for doc in docs {
        let child = find("$.x", &doc)?;
        let descendant = find("$..x", &doc)?;

        for node in &child {
            let child_count = child.iter().filter(|n| n == &node).count();
            let descendant_count = descendant.iter().filter(|n| n == &node).count();
            assert!(
                descendant_count >= child_count,
                "{doc}: {node} occurs {descendant_count} < {child_count} times"
            );
        }
    }

    Ok(())
}

#[test]
fn evaluation_never_fails() -> Result<(), Box<dyn Error>> {
    let queries = [
        "$.a.b.c",
        "$[10]",
        "$[-10]",
        "$[?@.x > 3]",
        "$..[5]",
        "$[1:100]",
        "$[::-1]",
        "$..*",
        "$[?match(@, '(')]",
        "$[?search(@.a, 'x')]",
        "$[?length(@) < 3]",
        "$[?value(@..b) == 1]",
    ];
    let docs = [
        json!(null),
        json!(true),
        json!(42),
        json!("string"),
        json!([]),
        json!({}),
        json!([[], {}, null, 1.5]),
        json!({"a": {"b": [1, 2, 3]}}),
    ];

    for query in &queries {
        let query = Query::standard(query)?;
        for doc in &docs {
            // any node list will do, including an empty one
            let _ = query.find(doc);
        }
    }

    Ok(())
}

#[test]
fn filters_see_object_members_in_sorted_key_order() -> Result<(), Box<dyn Error>> {
    let doc = json!({"z": 1, "a": 2, "m": 3});
    let nodes = find("$[?@ > 0]", &doc)?;
    let values: Vec<Value> = nodes.into_iter().cloned().collect();
    assert_eq!(values, vec![json!(2), json!(3), json!(1)]);
    Ok(())
}
