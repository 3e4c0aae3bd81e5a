//! Process-wide request surface for embedding applications.
//!
//! Mirrors the flat `Resource*` entry points a game shell calls into: one
//! installed [`ResourceManager`], addressed by path or by content hash
//! (`crc`). Every function returns an absent or zero result when no manager
//! is installed.

use std::sync::Arc;

use otrkit_resource::Resource;
use parking_lot::RwLock;

use crate::{ResourceHandle, ResourceManager};

static MANAGER: RwLock<Option<Arc<ResourceManager>>> = parking_lot::const_rwlock(None);

fn current() -> Option<Arc<ResourceManager>> {
    MANAGER.read().clone()
}

/// Install the process-wide manager, replacing any previous one.
pub fn install(manager: ResourceManager) -> Arc<ResourceManager> {
    let manager = Arc::new(manager);
    let previous = MANAGER.write().replace(Arc::clone(&manager));
    if previous.is_some() {
        tracing::debug!("replaced installed resource manager");
    }
    manager
}

/// Remove the installed manager. It shuts down once the last reference
/// is dropped.
pub fn uninstall() -> Option<Arc<ResourceManager>> {
    MANAGER.write().take()
}

pub fn is_resource_manager_loaded() -> bool {
    current().is_some_and(|manager| manager.is_loaded())
}

/// Load a resource by path, blocking until it is available.
pub fn resource_load(name: &str) -> Option<Arc<Resource>> {
    current()?.load_resource(name, true)
}

pub fn resource_load_by_crc(crc: u64) -> Option<Arc<Resource>> {
    current()?.load_resource_by_hash(crc, true)
}

/// Size of the resource's raw data, loading it if needed.
pub fn resource_get_size_by_name(name: &str) -> usize {
    resource_load(name).map_or(0, |resource| resource.pointer_size())
}

pub fn resource_get_size_by_crc(crc: u64) -> usize {
    resource_load_by_crc(crc).map_or(0, |resource| resource.pointer_size())
}

/// The resource whose [`raw_data`](Resource::raw_data) the caller reads.
pub fn resource_get_data_by_name(name: &str) -> Option<Arc<Resource>> {
    resource_load(name)
}

pub fn resource_get_data_by_crc(crc: u64) -> Option<Arc<Resource>> {
    resource_load_by_crc(crc)
}

/// Load every resource matching `mask` and return how many loaded.
pub fn resource_load_directory(mask: &str) -> usize {
    current().map_or(0, |manager| {
        manager
            .load_resources(mask)
            .iter()
            .filter(|resource| resource.is_some())
            .count()
    })
}

/// Queue every resource matching `mask`.
pub fn resource_load_directory_async(mask: &str) -> Vec<ResourceHandle> {
    current().map_or_else(Vec::new, |manager| manager.load_resources_async(mask))
}

pub fn resource_dirty_by_name(name: &str) -> bool {
    current().is_some_and(|manager| manager.dirty_resource(name))
}

pub fn resource_dirty_by_crc(crc: u64) -> bool {
    current().is_some_and(|manager| manager.dirty_resource_by_hash(crc))
}

pub fn resource_dirty_directory(mask: &str) -> usize {
    current().map_or(0, |manager| manager.dirty_directory(mask))
}

pub fn resource_unload_by_name(name: &str) -> bool {
    current().is_some_and(|manager| manager.unload_resource(name))
}

pub fn resource_unload_by_crc(crc: u64) -> bool {
    current().is_some_and(|manager| manager.unload_resource_by_hash(crc))
}

pub fn resource_unload_directory(mask: &str) -> usize {
    current().map_or(0, |manager| manager.unload_resources(mask))
}

pub fn resource_get_name_by_crc(crc: u64) -> Option<String> {
    current()?.hash_to_path(crc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use otrkit_archive::{ArchiveManager, MemoryArchive};
    use otrkit_common::{hash, BinaryWriter, Endianness, ResourceInitData, ResourceType};

    use crate::ManagerConfig;

    fn blob(payload: &[u8]) -> Vec<u8> {
        let mut init = ResourceInitData::headerless("x", ResourceType::Blob, 0);
        init.has_header = true;
        init.byte_order = Endianness::Little;
        let mut writer = BinaryWriter::new(Endianness::Little);
        init.write_header(&mut writer);
        writer.write_u32(payload.len() as u32).write_bytes(payload);
        writer.into_inner()
    }

    // The bridge is process-global, so everything runs in one test.
    #[test]
    fn test_bridge_lifecycle() {
        assert!(!is_resource_manager_loaded());
        assert!(resource_load("objects/a").is_none());
        assert_eq!(resource_get_size_by_name("objects/a"), 0);
        assert_eq!(resource_load_directory("*"), 0);

        let mut archives = ArchiveManager::new();
        archives.mount_archive(Arc::new(
            MemoryArchive::new("mem")
                .with_file("objects/a", blob(&[1, 2, 3]))
                .with_file("objects/b", blob(&[4])),
        ));
        let manager =
            ResourceManager::with_archives(archives, ManagerConfig::default()).unwrap();
        install(manager);
        assert!(is_resource_manager_loaded());

        let crc = hash::content_hash("objects/a");
        assert_eq!(resource_get_size_by_name("objects/a"), 3);
        assert_eq!(resource_get_size_by_crc(crc), 3);
        assert_eq!(resource_get_name_by_crc(crc).as_deref(), Some("objects/a"));
        assert_eq!(
            resource_get_data_by_crc(crc).map(|r| r.raw_data().to_vec()),
            Some(vec![1, 2, 3])
        );

        assert_eq!(resource_load_directory("objects/*"), 2);
        assert!(resource_dirty_by_name("objects/a"));
        assert_eq!(resource_dirty_directory("objects/*"), 2);
        assert!(resource_unload_by_crc(crc));
        assert_eq!(resource_unload_directory("objects/*"), 1);

        let handles = resource_load_directory_async("objects/*");
        assert_eq!(handles.len(), 2);
        assert!(handles.iter().all(|handle| handle.wait().is_some()));

        let manager = uninstall().unwrap();
        assert!(!is_resource_manager_loaded());
        manager.shutdown();
        assert!(!manager.is_loaded());
        assert!(resource_load_by_crc(crc).is_none());
    }
}
