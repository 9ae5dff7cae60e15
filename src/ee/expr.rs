//! Earth Engine computation graphs and their REST serialization.
//!
//! A graph is a tree of [`Node`]s. [`Expression::new`] turns it into the
//! `{ "result": key, "values": { key: ValueNode } }` form the REST API
//! expects. Nodes are inlined into their parent, except function bodies,
//! which the wire format requires to live in `values`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// A node of an Earth Engine computation graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Constant(Value),
    Array(Vec<Node>),
    Dictionary(BTreeMap<String, Node>),
    Invocation {
        function: String,
        arguments: BTreeMap<String, Node>,
    },
    Function {
        argument_names: Vec<String>,
        body: Box<Node>,
    },
    ArgumentRef(String),
}

impl Node {
    pub fn constant(value: impl Into<Value>) -> Self {
        Node::Constant(value.into())
    }

    pub fn string(value: &str) -> Self {
        Node::Constant(Value::String(value.to_string()))
    }

    /// Array of string constants.
    pub fn strings<S: AsRef<str>>(values: &[S]) -> Self {
        Node::Array(values.iter().map(|s| Node::string(s.as_ref())).collect())
    }

    /// Invoke an Earth Engine algorithm with named arguments.
    pub fn invoke<I, K>(function: &str, arguments: I) -> Self
    where
        I: IntoIterator<Item = (K, Node)>,
        K: Into<String>,
    {
        Node::Invocation {
            function: function.to_string(),
            arguments: arguments.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Build a one-argument function for `Collection.map`.
    ///
    /// The argument is named `_MAPPING_VAR_<depth>_0`, where depth counts the
    /// function definitions nested inside the body.
    pub fn lambda(body: impl FnOnce(Node) -> Node) -> Self {
        static NEXT_PLACEHOLDER: AtomicUsize = AtomicUsize::new(0);

        let placeholder = format!(
            "__placeholder_{}__",
            NEXT_PLACEHOLDER.fetch_add(1, Ordering::Relaxed)
        );
        let mut body = body(Node::ArgumentRef(placeholder.clone()));
        let name = format!("_MAPPING_VAR_{}_0", body.function_depth());
        body.rename_argument(&placeholder, &name);

        Node::Function {
            argument_names: vec![name],
            body: Box::new(body),
        }
    }

    /// Deepest nesting of function definitions below this node.
    pub fn function_depth(&self) -> usize {
        match self {
            Node::Constant(_) | Node::ArgumentRef(_) => 0,
            Node::Array(items) => items.iter().map(Node::function_depth).max().unwrap_or(0),
            Node::Dictionary(entries) => entries
                .values()
                .map(Node::function_depth)
                .max()
                .unwrap_or(0),
            Node::Invocation { arguments, .. } => arguments
                .values()
                .map(Node::function_depth)
                .max()
                .unwrap_or(0),
            Node::Function { body, .. } => 1 + body.function_depth(),
        }
    }

    fn rename_argument(&mut self, from: &str, to: &str) {
        match self {
            Node::ArgumentRef(name) if name == from => *name = to.to_string(),
            Node::Constant(_) | Node::ArgumentRef(_) => {}
            Node::Array(items) => items.iter_mut().for_each(|n| n.rename_argument(from, to)),
            Node::Dictionary(entries) => entries
                .values_mut()
                .for_each(|n| n.rename_argument(from, to)),
            Node::Invocation { arguments, .. } => arguments
                .values_mut()
                .for_each(|n| n.rename_argument(from, to)),
            Node::Function { body, .. } => body.rename_argument(from, to),
        }
    }
}

/// Serialized computation graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub result: String,
    pub values: BTreeMap<String, Value>,
}

impl Expression {
    /// Serialize a graph rooted at `root`.
    pub fn new(root: &Node) -> Self {
        let mut encoder = Encoder::default();
        let encoded = encoder.encode(root);
        let result = encoder.store(encoded);

        Self {
            result,
            values: encoder.values,
        }
    }
}

#[derive(Default)]
struct Encoder {
    values: BTreeMap<String, Value>,
}

impl Encoder {
    fn store(&mut self, value: Value) -> String {
        let key = self.values.len().to_string();
        self.values.insert(key.clone(), value);
        key
    }

    fn encode(&mut self, node: &Node) -> Value {
        match node {
            Node::Constant(value) => json!({ "constantValue": value }),
            Node::Array(items) => {
                let values: Vec<Value> = items.iter().map(|n| self.encode(n)).collect();
                json!({ "arrayValue": { "values": values } })
            }
            Node::Dictionary(entries) => {
                let values: Map<String, Value> = entries
                    .iter()
                    .map(|(k, n)| (k.clone(), self.encode(n)))
                    .collect();
                json!({ "dictionaryValue": { "values": values } })
            }
            Node::Invocation {
                function,
                arguments,
            } => {
                let arguments: Map<String, Value> = arguments
                    .iter()
                    .map(|(k, n)| (k.clone(), self.encode(n)))
                    .collect();
                json!({
                    "functionInvocationValue": {
                        "functionName": function,
                        "arguments": arguments,
                    }
                })
            }
            Node::Function {
                argument_names,
                body,
            } => {
                let encoded_body = self.encode(body);
                let body_key = self.store(encoded_body);
                json!({
                    "functionDefinitionValue": {
                        "argumentNames": argument_names,
                        "body": body_key,
                    }
                })
            }
            Node::ArgumentRef(name) => json!({ "argumentReference": name }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_root() {
        let expr = Expression::new(&Node::constant(42));
        assert_eq!(expr.result, "0");
        assert_eq!(expr.values["0"], json!({ "constantValue": 42 }));
    }

    #[test]
    fn test_invocation_inlines_arguments() {
        let node = Node::invoke(
            "ImageCollection.load",
            [("id", Node::string("LANDSAT/LC08/C02/T1_L2"))],
        );
        let expr = Expression::new(&node);
        assert_eq!(expr.values.len(), 1);
        assert_eq!(
            expr.values[&expr.result],
            json!({
                "functionInvocationValue": {
                    "functionName": "ImageCollection.load",
                    "arguments": { "id": { "constantValue": "LANDSAT/LC08/C02/T1_L2" } }
                }
            })
        );
    }

    #[test]
    fn test_function_body_stored_by_reference() {
        let mapper = Node::lambda(|img| Node::invoke("Image.select", [("input", img)]));
        let expr = Expression::new(&mapper);

        assert_eq!(expr.values.len(), 2);
        let root = &expr.values[&expr.result]["functionDefinitionValue"];
        assert_eq!(root["argumentNames"], json!(["_MAPPING_VAR_0_0"]));

        let body_key = root["body"].as_str().unwrap();
        assert_eq!(
            expr.values[body_key]["functionInvocationValue"]["arguments"]["input"],
            json!({ "argumentReference": "_MAPPING_VAR_0_0" })
        );
    }

    #[test]
    fn test_nested_lambdas_do_not_shadow() {
        let outer = Node::lambda(|outer_arg| {
            Node::invoke(
                "Collection.map",
                [
                    ("collection", outer_arg),
                    (
                        "baseAlgorithm",
                        Node::lambda(|inner_arg| Node::invoke("Image.abs", [("value", inner_arg)])),
                    ),
                ],
            )
        });

        match &outer {
            Node::Function {
                argument_names,
                body,
            } => {
                assert_eq!(argument_names, &vec!["_MAPPING_VAR_1_0".to_string()]);
                assert_eq!(body.function_depth(), 1);
            }
            other => panic!("expected function, got {:?}", other),
        }
    }
}
