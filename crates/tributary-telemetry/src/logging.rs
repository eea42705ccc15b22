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


//! Logger installation.

use env_logger::{Builder, Env};

/// Installs the global logger, filtered by `RUST_LOG` or `default_filter`
/// when the variable is unset.
///
/// Returns `false` if a logger was already installed, in which case the
/// existing one is kept.
pub fn init_logging(default_filter: &str) -> bool {
    Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .try_init()
        .is_ok()
}
