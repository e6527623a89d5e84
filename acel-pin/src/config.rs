//! adapter configuration
//!
//! fixes the pin-level signal set and widths; validated once, before any
//! signal is built

use serde::{Deserialize, Serialize};
use thiserror::Error;

use acel_bytes::MAX_LANES;
use acel_sim::{Clock, Time, DEFAULT_DESKEW};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("data width of {0} bits is not a power of two in 8..={max}", max = MAX_LANES * 8)]
    DataWidth(u32),
    #[error("address width of {0} bits is outside 12..=64")]
    AddrWidth(u32),
    #[error("{0} width of {1} bits exceeds 32")]
    FieldWidth(&'static str, u32),
    #[error("narrow mode: {0}")]
    Narrow(&'static str),
    #[error("stash hints need coherency signals and a 4-bit snoop")]
    Stash,
    #[error("snoop width must be 3 or 4 bits, got {0}")]
    SnoopWidth(u32),
    #[error("de-skew of {deskew}ps must fall in the first half of a {period}ps period")]
    Clock { period: Time, deskew: Time },
    #[error("configured for a {expected}ps clock de-skewed by {deskew}ps, driven by {period}ps")]
    ClockMismatch { expected: Time, deskew: Time, period: Time },
    #[error("signal `{0}` does not match the configuration")]
    Signal(String),
    #[error("failed to parse configuration: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// data bus width in bits
    pub data_width: u32,
    /// address bus width in bits
    pub addr_width: u32,
    /// identifier width in bits; 0 drops the id signals
    pub id_width: u32,
    /// user signal width in bits; 0 drops the user signals
    pub user_width: u32,
    /// narrow mode: single-beat transfers confined to one bus word
    pub lite: bool,
    /// ACE-Lite domain, snoop and barrier signals present
    pub coherent: bool,
    /// AWSNOOP width
    pub snoop_width: u32,
    /// stash target signals present
    pub stash: bool,
    /// the requester sends an explicit ACK phase after END_RESP
    pub explicit_ack: bool,
    /// clock period in picoseconds
    pub clock_period: Time,
    /// de-skew between clock edge and sample point in picoseconds
    pub deskew: Time,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_width: 64,
            addr_width: 32,
            id_width: 4,
            user_width: 0,
            lite: false,
            coherent: true,
            snoop_width: 3,
            stash: false,
            explicit_ack: false,
            clock_period: 10_000,
            deskew: DEFAULT_DESKEW,
        }
    }
}

impl Config {
    /// load a configuration from yaml; absent keys take their defaults
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Config =
            serde_yaml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// narrow-mode configuration with the given data width
    pub fn lite(data_width: u32) -> Self {
        Self {
            data_width,
            id_width: 0,
            lite: true,
            coherent: false,
            ..Self::default()
        }
    }

    /// data bus width in byte lanes
    pub fn bus_bytes(&self) -> usize {
        (self.data_width / 8) as usize
    }

    pub fn has_id(&self) -> bool {
        self.id_width > 0
    }

    /// mask applied to transaction ids before they reach the id signals
    pub fn id_mask(&self) -> u32 {
        match self.id_width {
            32 => u32::MAX,
            bits => (1u32 << bits) - 1,
        }
    }

    pub fn has_user(&self) -> bool {
        self.user_width > 0
    }

    /// the simulation clock the adapter expects to be driven by
    pub fn clock(&self) -> Result<Clock, ConfigError> {
        Clock::new_with(self.clock_period, self.deskew)
            .map_err(|_| ConfigError::Clock { period: self.clock_period, deskew: self.deskew })
    }

    /// mask applied to addresses before they reach the address bus
    pub fn addr_mask(&self) -> u64 {
        match self.addr_width {
            64 => u64::MAX,
            bits => (1u64 << bits) - 1,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let bits = self.data_width;
        if !bits.is_power_of_two() || !(8..=(MAX_LANES as u32) * 8).contains(&bits) {
            return Err(ConfigError::DataWidth(bits));
        }
        if !(12..=64).contains(&self.addr_width) {
            return Err(ConfigError::AddrWidth(self.addr_width));
        }
        if self.id_width > 32 {
            return Err(ConfigError::FieldWidth("id", self.id_width));
        }
        if self.user_width > 32 {
            return Err(ConfigError::FieldWidth("user", self.user_width));
        }
        if self.lite {
            if bits != 32 && bits != 64 {
                return Err(ConfigError::Narrow("data width must be 32 or 64 bits"));
            }
            if self.has_id() || self.has_user() {
                return Err(ConfigError::Narrow("no id or user signals"));
            }
            if self.coherent || self.stash {
                return Err(ConfigError::Narrow("no coherency signals"));
            }
        }
        if self.snoop_width != 3 && self.snoop_width != 4 {
            return Err(ConfigError::SnoopWidth(self.snoop_width));
        }
        if self.stash && (!self.coherent || self.snoop_width != 4) {
            return Err(ConfigError::Stash);
        }
        if self.deskew == 0 || self.deskew.saturating_mul(2) >= self.clock_period {
            return Err(ConfigError::Clock { period: self.clock_period, deskew: self.deskew });
        }
        Ok(())
    }
}
