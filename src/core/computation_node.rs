// Copyright @yucwang 2021

use std::sync::atomic::{ AtomicU64, Ordering };

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Generate a unique default ID for a scene object.
pub fn generate_node_id(type_name: &str) -> String {
    let seq = NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed);
    format!("{}_{}", type_name, seq)
}

/// Common surface of every object a scene is assembled from.
pub trait ComputationNode {
    fn id(&self) -> &str;

    // Human-readable summary, logged when the scene is activated.
    fn to_string(&self) -> String;
}
