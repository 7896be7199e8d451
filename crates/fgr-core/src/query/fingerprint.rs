use crate::{
    hash::{write_len_u32, write_str, write_tag, write_value},
    query::{Predicate, Query, SortDirection},
};
use sha2::{Digest, Sha256};

/// Hash predicate structure into the query hash stream.
fn hash_predicate(hasher: &mut Sha256, predicate: &Predicate) {
    match predicate {
        Predicate::Condition(condition) => {
            write_tag(hasher, 0x21);
            write_str(hasher, &condition.field);
            write_tag(hasher, condition.op.tag());
            write_value(hasher, &condition.value);

            match condition.threshold {
                Some(threshold) => {
                    write_tag(hasher, 0x01);
                    hasher.update(threshold.to_bits().to_be_bytes());
                }
                None => write_tag(hasher, 0x00),
            }
        }
        Predicate::And(left, right) => {
            write_tag(hasher, 0x22);
            hash_predicate(hasher, left);
            hash_predicate(hasher, right);
        }
        Predicate::Or(left, right) => {
            write_tag(hasher, 0x23);
            hash_predicate(hasher, left);
            hash_predicate(hasher, right);
        }
        Predicate::Not(inner) => {
            write_tag(hasher, 0x24);
            hash_predicate(hasher, inner);
        }
    }
}

pub(super) fn hash_query(query: &Query) -> [u8; 32] {
    let mut hasher = Sha256::new();

    match query.predicate() {
        Some(predicate) => {
            write_tag(&mut hasher, 0x01);
            hash_predicate(&mut hasher, predicate);
        }
        None => write_tag(&mut hasher, 0x00),
    }

    write_len_u32(&mut hasher, query.sorting().len());
    for sort in query.sorting() {
        write_str(&mut hasher, &sort.field);
        write_tag(
            &mut hasher,
            match sort.direction {
                SortDirection::Asc => 0x01,
                SortDirection::Desc => 0x02,
            },
        );
    }

    match query.limit() {
        Some(limit) => {
            write_tag(&mut hasher, 0x01);
            hasher.update(limit.to_be_bytes());
        }
        None => write_tag(&mut hasher, 0x00),
    }

    hasher.finalize().into()
}
