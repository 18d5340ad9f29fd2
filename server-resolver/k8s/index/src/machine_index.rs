use ahash::AHashMap as HashMap;
use tracing::{trace, warn};
use workspace_server_resolver_k8s_api::{Annotations, Resource, ResourceExt};

/// Indexes objects by the name of the machine they belong to.
///
/// Objects are kept in the order they were provided so that, when several objects of one machine
/// declare the same server, the last one consistently wins. The index is never modified after it
/// is built.
#[derive(Debug)]
pub(crate) struct MachineIndex<T> {
    by_machine: HashMap<String, Vec<T>>,
}

// === impl MachineIndex ===

impl<T: Resource<DynamicType = ()>> MachineIndex<T> {
    /// Indexes objects that must all be annotated with a machine name.
    ///
    /// An object without a machine name was created incorrectly; it is reported and excluded.
    pub(crate) fn strict(objects: impl IntoIterator<Item = T>) -> Self {
        Self::build(objects, |obj| {
            warn!(
                kind = %T::kind(&()),
                name = %obj.name_any(),
                "Object is not annotated with a machine name"
            );
        })
    }

    /// Indexes objects that may legitimately lack a machine name. Such objects are skipped.
    pub(crate) fn tolerant(objects: impl IntoIterator<Item = T>) -> Self {
        Self::build(objects, |obj| {
            trace!(kind = %T::kind(&()), name = %obj.name_any(), "Skipping");
        })
    }

    fn build(objects: impl IntoIterator<Item = T>, unowned: impl Fn(&T)) -> Self {
        let mut by_machine = HashMap::<String, Vec<T>>::default();
        for obj in objects {
            let machine = match Annotations::from_meta(obj.meta()).machine_name() {
                Some(machine) => machine.to_string(),
                None => {
                    unowned(&obj);
                    continue;
                }
            };
            trace!(kind = %T::kind(&()), name = %obj.name_any(), %machine, "Indexed");
            by_machine.entry(machine).or_default().push(obj);
        }
        Self { by_machine }
    }
}

impl<T> MachineIndex<T> {
    /// Returns the objects of `machine` in the order they were indexed.
    pub(crate) fn get(&self, machine: &str) -> &[T] {
        self.by_machine
            .get(machine)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(crate) fn machine_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.by_machine.keys().map(String::as_str)
    }
}
