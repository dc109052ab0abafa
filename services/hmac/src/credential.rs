// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::fmt::{Debug, Formatter};

use messagex_core::utils::Redact;

/// Credential for the hmac scheme.
///
/// Both parts are trimmed of surrounding whitespace at construction and
/// never change afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    access_key: String,
    secret: String,
}

impl Credential {
    /// Create a new credential.
    pub fn new(access_key: impl AsRef<str>, secret: impl AsRef<str>) -> Self {
        Self {
            access_key: access_key.as_ref().trim().to_string(),
            secret: secret.as_ref().trim().to_string(),
        }
    }

    /// Create the anonymous credential.
    ///
    /// Requests signed with it still carry a well formed `Authorization`
    /// header, just with an empty username and an empty HMAC key.
    pub fn anonymous() -> Self {
        Self::new("", "")
    }

    /// Access key part of the credential.
    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// Secret part of the credential.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Check if this is the anonymous credential.
    pub fn is_anonymous(&self) -> bool {
        self.access_key.is_empty() && self.secret.is_empty()
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_key", &Redact::from(&self.access_key))
            .field("secret", &Redact::from(&self.secret))
            .finish()
    }
}
