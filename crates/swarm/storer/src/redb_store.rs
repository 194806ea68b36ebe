//! redb-based durable tier.

use std::path::Path;

use bytes::Bytes;
use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};
use tracing::debug;
use vertex_swarm_api::ChunkAddress;

use crate::{ChunkStore, StorerResult};

/// Key: 32-byte chunk address. Value: span-prefixed content.
const CHUNKS_TABLE: TableDefinition<&[u8; 32], &[u8]> = TableDefinition::new("chunks");

/// Persistent chunk content store backed by redb.
///
/// Thread-safe for concurrent reads and writes.
pub struct RedbChunkStore {
    db: Database,
}

impl std::fmt::Debug for RedbChunkStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbChunkStore").finish_non_exhaustive()
    }
}

impl RedbChunkStore {
    /// Open or create a chunk store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> StorerResult<Self> {
        let db = Database::create(path.as_ref())?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CHUNKS_TABLE)?;
        }
        write_txn.commit()?;

        debug!(path = %path.as_ref().display(), "opened redb chunk store");
        Ok(Self { db })
    }
}

impl ChunkStore for RedbChunkStore {
    fn put(&self, address: &ChunkAddress, data: &[u8]) -> StorerResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(CHUNKS_TABLE)?;
            let key = address.as_bytes();
            if table.get(key)?.is_none() {
                table.insert(key, data)?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    fn get(&self, address: &ChunkAddress) -> StorerResult<Option<Bytes>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CHUNKS_TABLE)?;
        Ok(table
            .get(address.as_bytes())?
            .map(|value| Bytes::copy_from_slice(value.value())))
    }

    fn contains(&self, address: &ChunkAddress) -> StorerResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CHUNKS_TABLE)?;
        Ok(table.get(address.as_bytes())?.is_some())
    }

    fn count(&self) -> StorerResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CHUNKS_TABLE)?;
        Ok(table.len()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_address(n: u8) -> ChunkAddress {
        let mut bytes = [0u8; 32];
        bytes[0] = n;
        ChunkAddress::new(bytes)
    }

    #[test]
    fn test_put_get() {
        let dir = tempdir().unwrap();
        let store = RedbChunkStore::open(dir.path().join("chunks.redb")).unwrap();

        let addr = test_address(1);
        assert!(!store.contains(&addr).unwrap());

        store.put(&addr, b"hello world").unwrap();

        assert!(store.contains(&addr).unwrap());
        assert_eq!(store.get(&addr).unwrap().unwrap().as_ref(), b"hello world");
        assert_eq!(store.get(&test_address(2)).unwrap(), None);
    }

    #[test]
    fn test_count() {
        let dir = tempdir().unwrap();
        let store = RedbChunkStore::open(dir.path().join("chunks.redb")).unwrap();

        assert_eq!(store.count().unwrap(), 0);
        for i in 0..5 {
            store.put(&test_address(i), b"data").unwrap();
        }
        assert_eq!(store.count().unwrap(), 5);
    }

    #[test]
    fn test_first_write_wins() {
        let dir = tempdir().unwrap();
        let store = RedbChunkStore::open(dir.path().join("chunks.redb")).unwrap();

        let addr = test_address(4);
        store.put(&addr, b"first").unwrap();
        store.put(&addr, b"second").unwrap();

        assert_eq!(store.get(&addr).unwrap().unwrap().as_ref(), b"first");
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chunks.redb");
        {
            let store = RedbChunkStore::open(&path).unwrap();
            store.put(&test_address(7), b"persisted").unwrap();
        }

        let store = RedbChunkStore::open(&path).unwrap();
        assert_eq!(store.get(&test_address(7)).unwrap().unwrap().as_ref(), b"persisted");
    }
}
