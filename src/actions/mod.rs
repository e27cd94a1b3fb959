// Copyright 2025 Fernando Borretti
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

pub mod ai;
pub mod card;
pub mod deck;

use crate::error::ActionError;
use crate::error::ActionResult;
use crate::identity::Identity;
use crate::types::user::UserId;

/// Every action starts here: no identity, no mutation.
fn require_user(identity: &impl Identity) -> ActionResult<UserId> {
    identity.current_user().ok_or(ActionError::Unauthorized)
}
