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

use crate::{Error, Result};
use std::str::FromStr;

/// Default SolarNetwork API host.
pub const DEFAULT_HOST: &str = "data.solarnetwork.net";

/// Environment describes where the SolarNetwork API lives.
///
/// It is shared by the URL helpers, which need the full origin, and the
/// SNWS2 signer, which signs the `host` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    protocol: String,
    host: String,
    port: Option<u16>,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            protocol: "https".to_string(),
            host: DEFAULT_HOST.to_string(),
            port: None,
        }
    }
}

impl Environment {
    /// Create a new https environment for the given host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    /// Set the protocol, `http` or `https`.
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    /// Set an explicit port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// The protocol.
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// The bare host name.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The port, if one was set explicitly.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Host with the port appended when it differs from the protocol default.
    ///
    /// This is the value sent (and signed) as the `Host` header.
    pub fn host_with_port(&self) -> String {
        match self.port {
            Some(port) if Some(port) != default_port(&self.protocol) => {
                format!("{}:{}", self.host, port)
            }
            _ => self.host.clone(),
        }
    }

    /// The origin, for example `https://data.solarnetwork.net`.
    pub fn origin(&self) -> String {
        format!("{}://{}", self.protocol, self.host_with_port())
    }
}

impl FromStr for Environment {
    type Err = Error;

    /// Parse an environment from an origin such as `http://localhost:8080`.
    fn from_str(s: &str) -> Result<Self> {
        let uri: http::Uri = s.parse()?;
        let host = uri
            .host()
            .ok_or_else(|| Error::config_invalid(format!("environment url {s} has no host")))?;

        Ok(Self {
            protocol: uri.scheme_str().unwrap_or("https").to_string(),
            host: host.to_string(),
            port: uri.port_u16(),
        })
    }
}

fn default_port(protocol: &str) -> Option<u16> {
    match protocol {
        "http" => Some(80),
        "https" => Some(443),
        _ => None,
    }
}
