// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


//! Standard keys shared by every pipeline crate.
//!
//! Keys that need types from higher crates (the data object itself, the
//! required input type) are declared in those crates.

use super::{InformationKey, Propagation};
use crate::extent::{Bounds, Extent};

const LOC: &str = "tributary_core";

// ─── Meta-data produced during the information pass ─────────────────────────

/// Largest extent the producer can provide.
pub const WHOLE_EXTENT: InformationKey<Extent> =
    InformationKey::with_propagation(LOC, "WHOLE_EXTENT", Propagation::Downstream);

/// Discrete time values the producer can provide, ascending.
pub const TIME_STEPS: InformationKey<Vec<f64>> =
    InformationKey::with_propagation(LOC, "TIME_STEPS", Propagation::Downstream);

/// Continuous time range `[min, max]` the producer can provide.
pub const TIME_RANGE: InformationKey<[f64; 2]> =
    InformationKey::with_propagation(LOC, "TIME_RANGE", Propagation::Downstream);

/// Point spacing of an image producer.
pub const SPACING: InformationKey<[f64; 3]> =
    InformationKey::with_propagation(LOC, "SPACING", Propagation::Downstream);

/// Origin of an image producer.
pub const ORIGIN: InformationKey<[f64; 3]> =
    InformationKey::with_propagation(LOC, "ORIGIN", Propagation::Downstream);

/// Spatial bounds of the whole output, when known up front.
pub const WHOLE_BOUNDS: InformationKey<Bounds> =
    InformationKey::with_propagation(LOC, "WHOLE_BOUNDS", Propagation::Downstream);

/// Set by producers that can honor arbitrary piece requests.
pub const CAN_HANDLE_PIECE_REQUEST: InformationKey<bool> =
    InformationKey::new(LOC, "CAN_HANDLE_PIECE_REQUEST");

// ─── Requests produced during the update-extent pass ────────────────────────

/// Structured sub-extent requested from the producer.
pub const UPDATE_EXTENT: InformationKey<Extent> = InformationKey::new(LOC, "UPDATE_EXTENT");

/// Requested piece index.
pub const UPDATE_PIECE_NUMBER: InformationKey<i32> =
    InformationKey::with_propagation(LOC, "UPDATE_PIECE_NUMBER", Propagation::Upstream);

/// Total number of pieces the data is split into.
pub const UPDATE_NUMBER_OF_PIECES: InformationKey<i32> =
    InformationKey::with_propagation(LOC, "UPDATE_NUMBER_OF_PIECES", Propagation::Upstream);

/// Requested number of ghost levels around the piece.
pub const UPDATE_GHOST_LEVELS: InformationKey<i32> =
    InformationKey::with_propagation(LOC, "UPDATE_GHOST_LEVELS", Propagation::Upstream);

/// Requested time value.
pub const UPDATE_TIME_STEP: InformationKey<f64> =
    InformationKey::with_propagation(LOC, "UPDATE_TIME_STEP", Propagation::Upstream);

/// Set on a request when the consumer needs exactly the update extent.
pub const EXACT_EXTENT: InformationKey<bool> = InformationKey::new(LOC, "EXACT_EXTENT");

// ─── Data-side facts recorded after the data pass ───────────────────────────

/// Extent the producer actually generated.
pub const DATA_EXTENT: InformationKey<Extent> = InformationKey::new(LOC, "DATA_EXTENT");

/// Piece index the producer actually generated.
pub const DATA_PIECE_NUMBER: InformationKey<i32> = InformationKey::new(LOC, "DATA_PIECE_NUMBER");

/// Piece count the producer actually generated.
pub const DATA_NUMBER_OF_PIECES: InformationKey<i32> =
    InformationKey::new(LOC, "DATA_NUMBER_OF_PIECES");

/// Ghost levels the producer actually generated.
pub const DATA_NUMBER_OF_GHOST_LEVELS: InformationKey<i32> =
    InformationKey::new(LOC, "DATA_NUMBER_OF_GHOST_LEVELS");

/// Time value the produced data corresponds to.
pub const DATA_TIME_STEP: InformationKey<f64> = InformationKey::new(LOC, "DATA_TIME_STEP");

// ─── General ────────────────────────────────────────────────────────────────

/// Human-readable name, used for composite children and field arrays.
pub const NAME: InformationKey<String> = InformationKey::new(LOC, "NAME");

/// AMR level a block belongs to.
pub const AMR_LEVEL: InformationKey<u32> = InformationKey::new(LOC, "AMR_LEVEL");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::information::{Information, InformationVector};

    #[test]
    fn set_get_and_replace() {
        let mut info = Information::new();
        assert!(!info.has(&UPDATE_PIECE_NUMBER));

        info.set(&UPDATE_PIECE_NUMBER, 2);
        info.set(&UPDATE_PIECE_NUMBER, 3);

        assert_eq!(info.get(&UPDATE_PIECE_NUMBER), Some(&3));
        assert_eq!(info.len(), 1);
    }

    #[test]
    fn keys_with_same_name_in_other_locations_do_not_clash() {
        const OTHER: InformationKey<String> = InformationKey::new("elsewhere", "NAME");
        let mut info = Information::new();
        info.set(&NAME, "a".to_string());
        info.set(&OTHER, "b".to_string());

        assert_eq!(info.get(&NAME).map(String::as_str), Some("a"));
        assert_eq!(info.get(&OTHER).map(String::as_str), Some("b"));
    }

    #[test]
    fn remove_returns_owned_value() {
        let mut info = Information::new();
        info.set(&TIME_STEPS, vec![0.0, 0.5, 1.0]);

        assert_eq!(info.remove(&TIME_STEPS), Some(vec![0.0, 0.5, 1.0]));
        assert!(info.is_empty());
        assert_eq!(info.remove(&TIME_STEPS), None);
    }

    #[test]
    fn get_mut_edits_in_place() {
        let mut info = Information::new();
        info.set(&UPDATE_EXTENT, Extent::new(0, 9, 0, 9, 0, 0));
        if let Some(ext) = info.get_mut(&UPDATE_EXTENT) {
            *ext = ext.grow(1);
        }
        assert_eq!(
            info.get(&UPDATE_EXTENT),
            Some(&Extent::new(-1, 10, -1, 10, 0, 0))
        );
    }

    #[test]
    fn equality_compares_values() {
        let mut a = Information::new();
        let mut b = Information::new();
        a.set(&UPDATE_GHOST_LEVELS, 1);
        b.set(&UPDATE_GHOST_LEVELS, 1);
        assert_eq!(a, b);

        b.set(&UPDATE_GHOST_LEVELS, 2);
        assert_ne!(a, b);
    }

    #[test]
    fn propagation_copies_only_marked_missing_entries() {
        let mut upstream = Information::new();
        upstream.set(&WHOLE_EXTENT, Extent::new(0, 4, 0, 4, 0, 4));
        upstream.set(&SPACING, [1.0, 1.0, 1.0]);
        upstream.set(&UPDATE_EXTENT, Extent::new(0, 1, 0, 1, 0, 1));

        let mut downstream = Information::new();
        downstream.set(&SPACING, [2.0, 2.0, 2.0]);
        downstream.propagate_from(&upstream, Propagation::Downstream);

        assert_eq!(downstream.get(&WHOLE_EXTENT), upstream.get(&WHOLE_EXTENT));
        assert_eq!(downstream.get(&SPACING), Some(&[2.0, 2.0, 2.0]));
        assert!(!downstream.has(&UPDATE_EXTENT));
    }

    #[test]
    fn copy_entry_mirrors_presence() {
        let mut source = Information::new();
        source.set(&NAME, "block".to_string());
        let mut target = Information::new();
        target.set(&AMR_LEVEL, 2);

        target.copy_entry_from(&source, &NAME);
        target.copy_entry_from(&source, &AMR_LEVEL);

        assert_eq!(target.get(&NAME).map(String::as_str), Some("block"));
        assert!(!target.has(&AMR_LEVEL));
    }

    #[test]
    fn mutations_advance_modified_time() {
        let mut info = Information::new();
        let t0 = info.modified_time();
        info.set(&NAME, "x".to_string());
        let t1 = info.modified_time();
        info.remove(&NAME);
        let t2 = info.modified_time();

        assert!(t0 < t1);
        assert!(t1 < t2);
    }

    #[test]
    fn same_value_and_require() {
        let mut a = Information::new();
        let mut b = Information::new();
        assert!(a.same_value(&b, &DATA_TIME_STEP));

        a.set(&DATA_TIME_STEP, 0.5);
        assert!(!a.same_value(&b, &DATA_TIME_STEP));
        b.set(&DATA_TIME_STEP, 0.5);
        assert!(a.same_value(&b, &DATA_TIME_STEP));

        assert_eq!(a.require(&DATA_TIME_STEP), Ok(&0.5));
        assert_eq!(
            a.require(&NAME),
            Err(crate::information::InformationError::Missing(NAME.id()))
        );
    }

    #[test]
    fn vector_resizes_with_empty_maps() {
        let mut vector = InformationVector::with_len(1);
        vector.resize(3);
        assert_eq!(vector.len(), 3);
        assert!(vector.iter().all(Information::is_empty));
    }

    #[test]
    fn remove_propagating_keeps_other_directions() {
        let mut info = Information::new();
        info.set(&WHOLE_EXTENT, Extent::new(0, 4, 0, 4, 0, 0));
        info.set(&UPDATE_GHOST_LEVELS, 1);
        info.set(&NAME, "out".to_string());

        info.remove_propagating(crate::information::Propagation::Downstream);

        assert!(!info.has(&WHOLE_EXTENT));
        assert_eq!(info.get(&UPDATE_GHOST_LEVELS), Some(&1));
        assert!(info.has(&NAME));
    }
}
