#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod annotations;

pub use self::annotations::{AnnotationError, Annotations, AnnotationsBuilder};
pub use k8s_openapi::{
    api::{
        self,
        core::v1::{ConfigMap, Service},
        networking::v1::Ingress,
    },
    apimachinery::pkg::apis::meta::v1::ObjectMeta,
};
pub use kube::{Resource, ResourceExt};

/// Label set on every object created for a workspace.
pub const WORKSPACE_ID_LABEL: &str = "che.workspace_id";
