//! Horizontal pod autoscaler model used when a scaling plan is replayed.

pub mod interface;
pub mod kube_horizontal_pod_autoscaler;
