// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifier-unique ordered record sequence.

use scout_core::Record;
use serde::de::{SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

/// Ordered sequence of records, unique by `record_id`.
///
/// Insertion upserts: a duplicate identifier replaces the existing record
/// in place (order preserved), a new identifier appends. Buckets only
/// ever grow during a phase; there is no removal.
#[derive(Debug, Clone)]
pub struct Bucket<T: Record> {
    items: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T: Record> Default for Bucket<T> {
    fn default() -> Self {
        Self { items: Vec::new(), index: HashMap::new() }
    }
}

impl<T: Record> Bucket<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert by identifier. Returns `true` when the record was new.
    pub fn insert(&mut self, record: T) -> bool {
        debug_assert!(!record.record_id().is_empty(), "bucket record with empty id");
        let id = record.record_id().to_string();
        match self.index.get(&id) {
            Some(&position) => {
                self.items[position] = record;
                false
            }
            None => {
                self.index.insert(id, self.items.len());
                self.items.push(record);
                true
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|&position| &self.items[position])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Record identifiers in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.record_id())
    }
}

impl<'a, T: Record> IntoIterator for &'a Bucket<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

// Wire format is the plain item sequence; the index is rebuilt on read.

impl<T: Record> Serialize for Bucket<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.items.len()))?;
        for item in &self.items {
            seq.serialize_element(item)?;
        }
        seq.end()
    }
}

impl<'de, T: Record> Deserialize<'de> for Bucket<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BucketVisitor<T>(std::marker::PhantomData<T>);

        impl<'de, T: Record> Visitor<'de> for BucketVisitor<T> {
            type Value = Bucket<T>;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a sequence of records")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut bucket = Bucket::new();
                while let Some(item) = seq.next_element::<T>()? {
                    bucket.insert(item);
                }
                Ok(bucket)
            }
        }

        deserializer.deserialize_seq(BucketVisitor(std::marker::PhantomData))
    }
}

impl<T: Record> PartialEq for Bucket<T>
where
    T: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

#[cfg(test)]
#[path = "bucket_tests.rs"]
mod tests;
