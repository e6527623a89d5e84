//! pin-level signal bundles
//!
//! one bundle per channel; signals the configuration leaves out are `None`

use acel_bytes::{Strobe, Word};
use acel_sim::{Probe, Signal, Traced, Wires};

use crate::config::{Config, ConfigError};

fn signal<T: Traced>(prefix: &str, name: &str, width: u32, init: T) -> Signal<T> {
    Signal::new(&format!("{}.{}", prefix, name), width, init)
}

fn optional<T: Traced>(present: bool, prefix: &str, name: &str, width: u32, init: T) -> Option<Signal<T>> {
    present.then(|| signal(prefix, name, width, init))
}

/// write `value` if the signal exists in this configuration
pub fn drive<T: Traced>(sig: &mut Option<Signal<T>>, value: T) {
    if let Some(sig) = sig.as_mut() {
        sig.write(value)
    }
}

fn visit_opt<T: Traced>(sig: &Option<Signal<T>>, f: &mut dyn FnMut(&dyn Probe)) {
    if let Some(sig) = sig {
        f(sig)
    }
}

fn visit_opt_mut<T: Traced>(sig: &mut Option<Signal<T>>, f: &mut dyn FnMut(&mut dyn Probe)) {
    if let Some(sig) = sig {
        f(sig)
    }
}

fn check<T>(sig: &Option<Signal<T>>, name: &str, expected: bool) -> Result<(), ConfigError> {
    if sig.is_some() != expected {
        return Err(ConfigError::Signal(name.to_string()));
    }
    Ok(())
}

/// a present signal has to be `width` bits wide
fn sized<T: Traced>(sig: &Option<Signal<T>>, width: u32) -> Result<(), ConfigError> {
    match sig {
        Some(sig) if sig.width() != width => Err(ConfigError::Signal(sig.name().to_string())),
        _ => Ok(()),
    }
}

#[derive(Debug)]
pub struct StashPins {
    pub nid: Signal<u16>,
    pub nid_en: Signal<bool>,
    pub lpid: Signal<u8>,
    pub lpid_en: Signal<bool>,
}

/// read- or write-address channel
#[derive(Debug)]
pub struct AddrPins {
    pub valid: Signal<bool>,
    pub ready: Signal<bool>,
    pub addr: Signal<u64>,
    pub prot: Signal<u8>,
    pub id: Option<Signal<u32>>,
    pub len: Option<Signal<u8>>,
    pub size: Option<Signal<u8>>,
    pub burst: Option<Signal<u8>>,
    pub cache: Option<Signal<u8>>,
    pub qos: Option<Signal<u8>>,
    pub region: Option<Signal<u8>>,
    pub user: Option<Signal<u32>>,
    pub domain: Option<Signal<u8>>,
    pub snoop: Option<Signal<u8>>,
    pub bar: Option<Signal<u8>>,
    pub stash: Option<StashPins>,
}

impl AddrPins {
    fn new(prefix: &str, ch: &str, snoop_width: u32, stash: bool, config: &Config) -> Self {
        let full = !config.lite;
        let name = |sig: &str| format!("{}_{}", ch, sig);
        Self {
            valid: signal(prefix, &name("valid"), 1, false),
            ready: signal(prefix, &name("ready"), 1, false),
            addr: signal(prefix, &name("addr"), config.addr_width, 0),
            prot: signal(prefix, &name("prot"), 3, 0),
            id: optional(config.has_id(), prefix, &name("id"), config.id_width, 0),
            len: optional(full, prefix, &name("len"), 8, 0),
            size: optional(full, prefix, &name("size"), 3, 0),
            burst: optional(full, prefix, &name("burst"), 2, 0),
            cache: optional(full, prefix, &name("cache"), 4, 0),
            qos: optional(full, prefix, &name("qos"), 4, 0),
            region: optional(full, prefix, &name("region"), 4, 0),
            user: optional(config.has_user(), prefix, &name("user"), config.user_width, 0),
            domain: optional(config.coherent, prefix, &name("domain"), 2, 0),
            snoop: optional(config.coherent, prefix, &name("snoop"), snoop_width, 0),
            bar: optional(config.coherent, prefix, &name("bar"), 2, 0),
            stash: stash.then(|| StashPins {
                nid: signal(prefix, &name("stashnid"), 11, 0),
                nid_en: signal(prefix, &name("stashniden"), 1, false),
                lpid: signal(prefix, &name("stashlpid"), 5, 0),
                lpid_en: signal(prefix, &name("stashlpiden"), 1, false),
            }),
        }
    }

    fn check(&self, snoop_width: u32, stash: bool, config: &Config) -> Result<(), ConfigError> {
        let full = !config.lite;
        if self.addr.width() != config.addr_width {
            return Err(ConfigError::Signal(self.addr.name().to_string()));
        }
        check(&self.id, "id", config.has_id())?;
        sized(&self.id, config.id_width)?;
        for sig in [&self.len, &self.size, &self.burst, &self.cache, &self.qos, &self.region] {
            check(sig, "len/size/burst/cache/qos/region", full)?;
        }
        check(&self.user, "user", config.has_user())?;
        sized(&self.user, config.user_width)?;
        for sig in [&self.domain, &self.snoop, &self.bar] {
            check(sig, "domain/snoop/bar", config.coherent)?;
        }
        sized(&self.snoop, snoop_width)?;
        if self.stash.is_some() != stash {
            return Err(ConfigError::Signal("stash".to_string()));
        }
        Ok(())
    }

    fn visit(&self, f: &mut dyn FnMut(&dyn Probe)) {
        f(&self.valid);
        f(&self.ready);
        f(&self.addr);
        f(&self.prot);
        visit_opt(&self.id, f);
        for sig in [&self.len, &self.size, &self.burst, &self.cache, &self.qos, &self.region] {
            visit_opt(sig, f);
        }
        visit_opt(&self.user, f);
        for sig in [&self.domain, &self.snoop, &self.bar] {
            visit_opt(sig, f);
        }
        if let Some(stash) = &self.stash {
            f(&stash.nid);
            f(&stash.nid_en);
            f(&stash.lpid);
            f(&stash.lpid_en);
        }
    }

    fn visit_mut(&mut self, f: &mut dyn FnMut(&mut dyn Probe)) {
        f(&mut self.valid);
        f(&mut self.ready);
        f(&mut self.addr);
        f(&mut self.prot);
        visit_opt_mut(&mut self.id, f);
        for sig in [
            &mut self.len,
            &mut self.size,
            &mut self.burst,
            &mut self.cache,
            &mut self.qos,
            &mut self.region,
        ] {
            visit_opt_mut(sig, f);
        }
        visit_opt_mut(&mut self.user, f);
        for sig in [&mut self.domain, &mut self.snoop, &mut self.bar] {
            visit_opt_mut(sig, f);
        }
        if let Some(stash) = &mut self.stash {
            f(&mut stash.nid);
            f(&mut stash.nid_en);
            f(&mut stash.lpid);
            f(&mut stash.lpid_en);
        }
    }
}

/// write-data channel
#[derive(Debug)]
pub struct WPins {
    pub valid: Signal<bool>,
    pub ready: Signal<bool>,
    pub data: Signal<Word>,
    pub strb: Signal<Strobe>,
    pub last: Option<Signal<bool>>,
    pub user: Option<Signal<u32>>,
}

/// read-data channel
#[derive(Debug)]
pub struct RPins {
    pub valid: Signal<bool>,
    pub ready: Signal<bool>,
    pub data: Signal<Word>,
    pub resp: Signal<u8>,
    pub id: Option<Signal<u32>>,
    pub last: Option<Signal<bool>>,
}

/// write-response channel
#[derive(Debug)]
pub struct BPins {
    pub valid: Signal<bool>,
    pub ready: Signal<bool>,
    pub resp: Signal<u8>,
    pub id: Option<Signal<u32>>,
}

/// every signal between the adapter and its peer
#[derive(Debug)]
pub struct Pins {
    pub ar: AddrPins,
    pub r: RPins,
    pub aw: AddrPins,
    pub w: WPins,
    pub b: BPins,
}

impl Pins {
    /// build the signal set `config` asks for, named under `prefix`
    pub fn new(prefix: &str, config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let bus = config.bus_bytes();
        let full = !config.lite;
        Ok(Self {
            ar: AddrPins::new(prefix, "ar", 4, false, config),
            r: RPins {
                valid: signal(prefix, "r_valid", 1, false),
                ready: signal(prefix, "r_ready", 1, false),
                data: signal(prefix, "r_data", config.data_width, Word::zeroed(bus)),
                resp: signal(prefix, "r_resp", 2, 0),
                id: optional(config.has_id(), prefix, "r_id", config.id_width, 0),
                last: optional(full, prefix, "r_last", 1, false),
            },
            aw: AddrPins::new(prefix, "aw", config.snoop_width, config.stash, config),
            w: WPins {
                valid: signal(prefix, "w_valid", 1, false),
                ready: signal(prefix, "w_ready", 1, false),
                data: signal(prefix, "w_data", config.data_width, Word::zeroed(bus)),
                strb: signal(prefix, "w_strb", bus as u32, Strobe::NONE),
                last: optional(full, prefix, "w_last", 1, false),
                user: optional(config.has_user(), prefix, "w_user", config.user_width, 0),
            },
            b: BPins {
                valid: signal(prefix, "b_valid", 1, false),
                ready: signal(prefix, "b_ready", 1, false),
                resp: signal(prefix, "b_resp", 2, 0),
                id: optional(config.has_id(), prefix, "b_id", config.id_width, 0),
            },
        })
    }

    /// verify this signal set is the one `config` describes
    pub fn check(&self, config: &Config) -> Result<(), ConfigError> {
        let full = !config.lite;
        self.ar.check(4, false, config)?;
        self.aw.check(config.snoop_width, config.stash, config)?;
        check(&self.r.id, "r_id", config.has_id())?;
        sized(&self.r.id, config.id_width)?;
        check(&self.r.last, "r_last", full)?;
        check(&self.w.last, "w_last", full)?;
        check(&self.w.user, "w_user", config.has_user())?;
        sized(&self.w.user, config.user_width)?;
        check(&self.b.id, "b_id", config.has_id())?;
        sized(&self.b.id, config.id_width)?;
        if self.w.data.read().width() != config.bus_bytes()
            || self.r.data.read().width() != config.bus_bytes()
        {
            return Err(ConfigError::Signal("data".to_string()));
        }
        Ok(())
    }
}

impl Wires for Pins {
    fn visit(&self, f: &mut dyn FnMut(&dyn Probe)) {
        self.ar.visit(f);
        f(&self.r.valid);
        f(&self.r.ready);
        f(&self.r.data);
        f(&self.r.resp);
        visit_opt(&self.r.id, f);
        visit_opt(&self.r.last, f);
        self.aw.visit(f);
        f(&self.w.valid);
        f(&self.w.ready);
        f(&self.w.data);
        f(&self.w.strb);
        visit_opt(&self.w.last, f);
        visit_opt(&self.w.user, f);
        f(&self.b.valid);
        f(&self.b.ready);
        f(&self.b.resp);
        visit_opt(&self.b.id, f);
    }

    fn visit_mut(&mut self, f: &mut dyn FnMut(&mut dyn Probe)) {
        self.ar.visit_mut(f);
        f(&mut self.r.valid);
        f(&mut self.r.ready);
        f(&mut self.r.data);
        f(&mut self.r.resp);
        visit_opt_mut(&mut self.r.id, f);
        visit_opt_mut(&mut self.r.last, f);
        self.aw.visit_mut(f);
        f(&mut self.w.valid);
        f(&mut self.w.ready);
        f(&mut self.w.data);
        f(&mut self.w.strb);
        visit_opt_mut(&mut self.w.last, f);
        visit_opt_mut(&mut self.w.user, f);
        f(&mut self.b.valid);
        f(&mut self.b.ready);
        f(&mut self.b.resp);
        visit_opt_mut(&mut self.b.id, f);
    }
}
