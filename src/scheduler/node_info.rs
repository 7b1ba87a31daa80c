use k8s_openapi::api::core::v1::Node;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// The candidate node as seen by filter plugins.
#[derive(Debug, Clone, Default)]
pub struct NodeInfo {
    node: Node,
}

impl NodeInfo {
    pub fn from_name(name: &str) -> Self {
        NodeInfo {
            node: Node {
                metadata: ObjectMeta {
                    name: Some(name.to_string()),
                    ..Default::default()
                },
                ..Default::default()
            },
        }
    }

    pub fn name(&self) -> &str {
        self.node.metadata.name.as_deref().unwrap_or_default()
    }
}
