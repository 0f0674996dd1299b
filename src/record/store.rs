//! `SlottedRecordStore`: tuples packed into pages behind the buffer pool.
//!
//! Grounded end to end in `record_mgr.c` (`createTable`/`openTable`/
//! `closeTable`/`deleteTable`/`insertRecord`/`getRecord`/`deleteRecord`/
//! `startScan`+`next`). Unlike the B+ tree (O-1), the schema header really
//! is persisted: `create_table` writes it to page 0 and `open_table` reads
//! it back, matching the original's `createTable`/`openTable` pair.
//!
//! The original's `Expr`/`evalExpr` scan-condition language is out of
//! scope (§1 Non-goals: "no query planner"); `scan` takes a plain
//! `Fn(&[Value]) -> bool` predicate instead, which covers the same
//! operational surface.

use crate::buffer::{BufferPool, LruStrategy};
use crate::error::{Result, StorageError};
use crate::storage::BlockDevice;
use crate::types::{PageId, Rid, Value, PAGE_SIZE};
use std::path::Path;

use super::schema::Schema;
use super::tuple::{decode_tuple, encode_tuple, TOMBSTONE_LIVE};

/// Record-manager buffer pool capacity, matching the original's
/// `MAX_NUMBER_OF_PAGES`.
const RECORD_POOL_CAPACITY: usize = 100;

/// First page available for tuple storage; page 0 holds the schema header.
const FIRST_DATA_PAGE: i64 = 1;

/// A table: tuples packed into fixed-size pages behind a buffer pool,
/// addressed by `(page, slot)` record ids.
pub struct SlottedRecordStore<D> {
    pool: BufferPool<D>,
    schema: Schema,
    num_tuples: u32,
    first_free_page: PageId,
}

impl<D: BlockDevice> SlottedRecordStore<D> {
    /// Create the backing device and write the schema header to page 0.
    pub fn create_table(name: &Path, schema: &Schema) -> Result<()> {
        D::create(name)?;
        let mut device = D::open(name)?;
        let header = schema.encode_header(0, FIRST_DATA_PAGE as u32);
        let mut page = [0u8; PAGE_SIZE];
        page.copy_from_slice(&header);
        device.write_page(PageId::new(0), &page)?;
        device.close()
    }

    /// Attach a buffer pool and read the schema header back from page 0.
    ///
    /// Grounded in the original's choice of LRU for the record manager's
    /// pool (`initBufferPool(..., RS_LRU, ...)` in `createTable`), distinct
    /// from the B+ tree's FIFO pool.
    pub fn open_table(name: &Path) -> Result<Self> {
        let device = D::open(name)?;
        let pool = BufferPool::new(device, RECORD_POOL_CAPACITY, Box::new(LruStrategy::new()));
        let (schema, num_tuples, first_free_page) = {
            let guard = pool.pin(PageId::new(0))?;
            Schema::decode_header(&guard.data())
        };
        Ok(Self {
            pool,
            schema,
            num_tuples,
            first_free_page: PageId::new(first_free_page as i64),
        })
    }

    /// Flush the pool and release in-memory state.
    pub fn close_table(self) -> Result<()> {
        self.pool.shutdown()
    }

    /// Destroy the backing device.
    pub fn delete_table(name: &Path) -> Result<()> {
        D::destroy(name)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn num_tuples(&self) -> u32 {
        self.num_tuples
    }

    /// Insert `values`, scanning forward from `first_free_page` for a free
    /// slot the way `insertRecord`'s `findFreeSlot` loop does.
    pub fn insert_record(&mut self, values: &[Value]) -> Result<Rid> {
        let encoded = encode_tuple(&self.schema, values);
        let record_size = self.schema.record_size();
        let slots_per_page = self.schema.slots_per_page();

        let mut page = self.first_free_page;
        loop {
            let guard = self.pool.pin(page)?;
            let data = guard.data();
            let slot = find_free_slot(&data, record_size, slots_per_page);
            match slot {
                Some(slot) => {
                    let mut new_data = data;
                    let offset = slot * record_size;
                    new_data[offset..offset + record_size].copy_from_slice(&encoded);
                    guard.write(&new_data);
                    guard.mark_dirty();
                    drop(guard);
                    self.num_tuples += 1;
                    self.first_free_page = page;
                    return Ok(Rid::new(page, slot as u32));
                }
                None => {
                    drop(guard);
                    page = PageId::new(page.value() + 1);
                    log::trace!("insert_record: page full, advancing to {page}");
                }
            }
        }
    }

    /// Fetch the tuple at `rid`. `NoTupleWithRid` if its tombstone isn't
    /// live.
    pub fn get_record(&mut self, rid: Rid) -> Result<Vec<Value>> {
        let record_size = self.schema.record_size();
        let guard = self.pool.pin(rid.page)?;
        let data = guard.data();
        let offset = rid.slot as usize * record_size;
        let slot = &data[offset..offset + record_size];
        if slot[0] != TOMBSTONE_LIVE {
            return Err(StorageError::NoTupleWithRid(rid));
        }
        Ok(decode_tuple(&self.schema, slot))
    }

    /// Tombstone the slot at `rid`. Matches `deleteRecord`'s side effect of
    /// pointing the free-page cursor back at the freed page.
    pub fn delete_record(&mut self, rid: Rid) -> Result<()> {
        let record_size = self.schema.record_size();
        let guard = self.pool.pin(rid.page)?;
        let mut data = guard.data();
        let offset = rid.slot as usize * record_size;
        data[offset] = super::tuple::TOMBSTONE_DELETED;
        guard.write(&data);
        guard.mark_dirty();
        drop(guard);
        self.num_tuples = self.num_tuples.saturating_sub(1);
        self.first_free_page = rid.page;
        Ok(())
    }

    /// Linear scan over every live tuple in RID order, keeping only those
    /// matching `predicate`.
    pub fn scan(&mut self, predicate: impl Fn(&[Value]) -> bool) -> Result<Vec<(Rid, Vec<Value>)>> {
        if self.num_tuples == 0 {
            return Err(StorageError::NoRecordsToScan);
        }
        let record_size = self.schema.record_size();
        let slots_per_page = self.schema.slots_per_page();
        let mut out = Vec::new();

        let mut page = FIRST_DATA_PAGE;
        let mut seen = 0u32;
        while seen < self.num_tuples {
            let guard = self.pool.pin(PageId::new(page))?;
            let data = guard.data();
            drop(guard);
            for slot in 0..slots_per_page {
                let offset = slot * record_size;
                let record = &data[offset..offset + record_size];
                if record[0] != TOMBSTONE_LIVE {
                    continue;
                }
                seen += 1;
                let values = decode_tuple(&self.schema, record);
                if predicate(&values) {
                    out.push((Rid::new(PageId::new(page), slot as u32), values));
                }
            }
            page += 1;
        }
        Ok(out)
    }
}

fn find_free_slot(data: &[u8], record_size: usize, slots_per_page: usize) -> Option<usize> {
    (0..slots_per_page).find(|&slot| data[slot * record_size] != TOMBSTONE_LIVE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::schema::Attribute;
    use crate::storage::FileBlockDevice;
    use crate::types::DataType;
    use tempfile::tempdir;

    fn sample_schema() -> Schema {
        Schema::new(
            vec![
                Attribute::new("id", DataType::Int, 0),
                Attribute::new("name", DataType::String, 10),
            ],
            4,
        )
    }

    fn open_store(name: &Path, schema: &Schema) -> SlottedRecordStore<FileBlockDevice> {
        crate::test_support::init_log();
        SlottedRecordStore::<FileBlockDevice>::create_table(name, schema).unwrap();
        SlottedRecordStore::<FileBlockDevice>::open_table(name).unwrap()
    }

    #[test]
    fn insert_then_get() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.bin");
        let schema = sample_schema();
        let mut store = open_store(&path, &schema);

        let rid = store
            .insert_record(&[Value::Int(1), Value::String("alice".into())])
            .unwrap();
        let values = store.get_record(rid).unwrap();
        assert_eq!(values, vec![Value::Int(1), Value::String("alice".into())]);
        assert_eq!(store.num_tuples(), 1);
    }

    #[test]
    fn delete_tombstones_and_get_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.bin");
        let schema = sample_schema();
        let mut store = open_store(&path, &schema);

        let rid = store
            .insert_record(&[Value::Int(1), Value::String("alice".into())])
            .unwrap();
        store.delete_record(rid).unwrap();
        assert!(matches!(store.get_record(rid), Err(StorageError::NoTupleWithRid(_))));
    }

    #[test]
    fn scan_returns_live_tuples_matching_predicate() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.bin");
        let schema = sample_schema();
        let mut store = open_store(&path, &schema);

        for (id, name) in [(1, "alice"), (2, "bob"), (3, "carol")] {
            store.insert_record(&[Value::Int(id), Value::String(name.into())]).unwrap();
        }
        let rid_to_delete = Rid::new(PageId::new(1), 1);
        store.delete_record(rid_to_delete).unwrap();

        let results = store.scan(|_| true).unwrap();
        assert_eq!(results.len(), 2);
        let ids: Vec<i32> = results
            .iter()
            .map(|(_, v)| match v[0] {
                Value::Int(i) => i,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn scan_empty_table_is_no_records_to_scan() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.bin");
        let schema = sample_schema();
        let mut store = open_store(&path, &schema);
        assert!(matches!(store.scan(|_| true), Err(StorageError::NoRecordsToScan)));
    }

    #[test]
    fn schema_round_trips_through_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.bin");
        let schema = sample_schema();
        SlottedRecordStore::<FileBlockDevice>::create_table(&path, &schema).unwrap();
        let store = SlottedRecordStore::<FileBlockDevice>::open_table(&path).unwrap();
        assert_eq!(store.schema(), &schema);
    }
}
