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


//! One-call file helpers.

use crate::legacy::{self, DEFAULT_TITLE};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tributary_data::DataObject;

/// Reads the composite object stored at `path`.
pub fn read_composite(path: impl AsRef<Path>) -> Result<DataObject> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    legacy::from_legacy_str(&text).with_context(|| format!("Failed to decode {}", path.display()))
}

/// Writes `object` to `path`, replacing any existing file.
pub fn write_composite(path: impl AsRef<Path>, object: &DataObject) -> Result<()> {
    let path = path.as_ref();
    let text = legacy::to_legacy_string(object, DEFAULT_TITLE)
        .with_context(|| format!("Failed to encode a {}", object.data_type()))?;
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}
