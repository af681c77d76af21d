//! Builders for Kubernetes objects used across analysis tests

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{
    Container, Node, NodeCondition, NodeStatus, Pod, PodSpec, ResourceRequirements,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};

pub struct PodFixture {
    pub namespace: &'static str,
    pub name: &'static str,
    pub node: Option<&'static str>,
    pub owners: Vec<(&'static str, &'static str)>,
    pub labels: Vec<(&'static str, &'static str)>,
    /// (cpu, memory) requests per container
    pub containers: Vec<(&'static str, &'static str)>,
}

impl PodFixture {
    pub fn new(namespace: &'static str, name: &'static str) -> Self {
        Self {
            namespace,
            name,
            node: None,
            owners: Vec::new(),
            labels: Vec::new(),
            containers: Vec::new(),
        }
    }
}

pub struct NodeFixture {
    pub name: &'static str,
    pub cpu: &'static str,
    pub memory: &'static str,
    /// Status of the Ready condition, `None` for no condition at all
    pub ready: Option<&'static str>,
}

impl NodeFixture {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            cpu: "4",
            memory: "8Gi",
            ready: Some("True"),
        }
    }
}

fn resource_list(cpu: &str, memory: &str) -> BTreeMap<String, Quantity> {
    BTreeMap::from([
        ("cpu".to_string(), Quantity(cpu.to_string())),
        ("memory".to_string(), Quantity(memory.to_string())),
    ])
}

pub fn pod(fixture: PodFixture) -> Pod {
    let owners: Vec<OwnerReference> = fixture
        .owners
        .iter()
        .map(|(kind, name)| OwnerReference {
            kind: kind.to_string(),
            name: name.to_string(),
            ..Default::default()
        })
        .collect();

    let labels: BTreeMap<String, String> = fixture
        .labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let containers = fixture
        .containers
        .iter()
        .enumerate()
        .map(|(i, (cpu, memory))| Container {
            name: format!("c{i}"),
            resources: Some(ResourceRequirements {
                requests: Some(resource_list(cpu, memory)),
                ..Default::default()
            }),
            ..Default::default()
        })
        .collect();

    Pod {
        metadata: ObjectMeta {
            name: Some(fixture.name.to_string()),
            namespace: Some(fixture.namespace.to_string()),
            owner_references: (!owners.is_empty()).then_some(owners),
            labels: (!labels.is_empty()).then_some(labels),
            ..Default::default()
        },
        spec: Some(PodSpec {
            node_name: fixture.node.map(str::to_string),
            containers,
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn node(fixture: NodeFixture) -> Node {
    let conditions = fixture.ready.map(|status| {
        vec![
            NodeCondition {
                type_: "MemoryPressure".to_string(),
                status: "False".to_string(),
                ..Default::default()
            },
            NodeCondition {
                type_: "Ready".to_string(),
                status: status.to_string(),
                ..Default::default()
            },
        ]
    });

    Node {
        metadata: ObjectMeta {
            name: Some(fixture.name.to_string()),
            ..Default::default()
        },
        status: Some(NodeStatus {
            allocatable: Some(resource_list(fixture.cpu, fixture.memory)),
            conditions,
            ..Default::default()
        }),
        ..Default::default()
    }
}
