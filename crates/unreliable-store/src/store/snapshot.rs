//! Conversion between live entries and the intermediate document.
//!
//! Each key maps to a `[value, index]` record where `index` is the entry's
//! head-to-tail position. Restoring sorts records back by index, so the
//! recency order survives a round trip exactly.

use crate::codec::{json_kind, Document};
use crate::error::{Result, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

const VALUE_POSITION: usize = 0;
const INDEX_POSITION: usize = 1;
const RECORD_LEN: usize = 2;

/// Build the document for entries given in head-to-tail order.
pub(crate) fn capture<'a, V, I>(entries: I, fingerprint: Option<&str>) -> Result<Document>
where
    V: Serialize + 'a,
    I: IntoIterator<Item = (&'a String, &'a V)>,
{
    let mut dataset = Document::new();
    for (index, (key, value)) in entries.into_iter().enumerate() {
        let record = vec![serde_json::to_value(value)?, Value::from(index)];
        dataset.insert(key.clone(), Value::Array(record));
    }

    Ok(match fingerprint {
        Some(fingerprint) => {
            let mut wrapped = Document::new();
            wrapped.insert(fingerprint.to_owned(), Value::Object(dataset));
            wrapped
        }
        None => dataset,
    })
}

/// Extract this store's entries from a decoded document, in index order.
///
/// Indices must form the dense range `0..n`. Duplicates, gaps and
/// out-of-range values are reported as [`StoreError::CorruptIndex`].
/// A record whose value does not deserialize into `V` is skipped on its own;
/// the remaining entries keep their relative order.
pub(crate) fn restore<V>(mut document: Document, fingerprint: Option<&str>) -> Result<Vec<(String, V)>>
where
    V: DeserializeOwned,
{
    let dataset = match fingerprint {
        Some(fingerprint) => match document.remove(fingerprint) {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Object(dataset)) => dataset,
            Some(other) => {
                return Err(StoreError::decode(format!(
                    "fingerprint {:?} holds {}, expected an object",
                    fingerprint,
                    json_kind(&other)
                )))
            }
        },
        None => document,
    };

    let len = dataset.len();
    let mut slots: Vec<Option<(String, Value)>> = (0..len).map(|_| None).collect();

    for (key, record) in dataset {
        let (value, index) = split_record(&key, record)?;
        let Some(slot) = usize::try_from(index)
            .ok()
            .and_then(|i| slots.get_mut(i))
            .filter(|slot| slot.is_none())
        else {
            return Err(StoreError::CorruptIndex { key, index, len });
        };
        *slot = Some((key, value));
    }

    // n records landed in n distinct slots, so every slot is filled.
    Ok(slots
        .into_iter()
        .flatten()
        .filter_map(|(key, value)| match serde_json::from_value(value) {
            Ok(value) => Some((key, value)),
            Err(e) => {
                warn!(key = %key, error = %e, "Skipping stored value that does not fit the value type");
                None
            }
        })
        .collect())
}

fn split_record(key: &str, record: Value) -> Result<(Value, u64)> {
    let mut parts = match record {
        Value::Array(parts) if parts.len() == RECORD_LEN => parts,
        other => {
            return Err(StoreError::decode(format!(
                "record for key {:?} is {}, expected a [value, index] pair",
                key,
                json_kind(&other)
            )))
        }
    };

    let index = parts[INDEX_POSITION].as_u64().ok_or_else(|| {
        StoreError::decode(format!("record for key {:?} has a non-integer index", key))
    })?;
    Ok((parts.swap_remove(VALUE_POSITION), index))
}
