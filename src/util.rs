use crate::term::{FixGroup, TermPtr};
use crate::STACK_SIZE;
use indexmap::IndexMap;
use rustc_hash::FxHasher;
use serde::Deserialize;
use std::collections::HashMap;
use std::error::Error;
use std::fs::OpenOptions;
use std::hash::BuildHasherDefault;
use std::io::BufReader;
use std::path::Path;

pub(crate) type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;
pub(crate) type FxHashMap<K, V> = HashMap<K, V, BuildHasherDefault<FxHasher>>;

pub(crate) fn new_fx_index_map<K, V>() -> FxIndexMap<K, V> { FxIndexMap::with_hasher(Default::default()) }

pub(crate) fn new_fx_hash_map<K, V>() -> FxHashMap<K, V> { FxHashMap::with_hasher(Default::default()) }

pub(crate) const fn default_stack_size() -> usize { STACK_SIZE }

pub(crate) fn default_specialized_name_format() -> String { String::from("{name}_{args}") }

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Stack size in bytes for the worker thread started by [`Config::with_stack`].
    /// Checking and rewriting recurse once per term level, so deeply nested terms
    /// need more than the default thread stack.
    #[serde(default = "default_stack_size")]
    pub stack_size: usize,

    /// Template for the names of specialized fixpoint functions. `{name}` is the
    /// original function name, `{args}` the constants' debug strings joined by `_`,
    /// and `{index}` the function's position in the bundle.
    #[serde(default = "default_specialized_name_format")]
    pub specialized_name_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Config { stack_size: default_stack_size(), specialized_name_format: default_specialized_name_format() }
    }
}

impl TryFrom<&Path> for Config {
    type Error = Box<dyn Error>;
    fn try_from(p: &Path) -> Result<Config, Self::Error> {
        match OpenOptions::new().read(true).truncate(false).open(p) {
            Err(e) => Err(Box::from(format!("failed to open configuration file: {:?}", e))),
            Ok(config_file) => {
                let config = serde_json::from_reader::<_, Config>(BufReader::new(config_file))
                    .map_err(|e| format!("failed to parse configuration file: {}", e))?;
                config.validate()?;
                Ok(config)
            }
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        if self.stack_size == 0 {
            return Err(Box::from("invalid config: `stack_size` must be nonzero"))
        }
        let fmt = &self.specialized_name_format;
        if !fmt.contains("{name}") && !fmt.contains("{index}") {
            return Err(Box::from(format!(
                "invalid config: `specialized_name_format` ({:?}) must mention {{name}} or {{index}}",
                fmt
            )))
        }
        Ok(())
    }

    /// Run `f` on a scoped thread with a `stack_size` byte stack and wait for it.
    pub fn with_stack<F, A>(&self, f: F) -> Result<A, Box<dyn Error>>
    where
        F: FnOnce() -> A + Send,
        A: Send, {
        std::thread::scope(|s| -> Result<A, Box<dyn Error>> {
            let handle = std::thread::Builder::new().stack_size(self.stack_size).spawn_scoped(s, f)?;
            handle.join().map_err(|_| Box::from("worker thread panicked"))
        })
    }

    /// The name of function `index` of `group` once specialized on `constants`.
    pub fn specialized_name(&self, group: &FixGroup, index: usize, constants: &[TermPtr]) -> String {
        let name = group.function(index).map(|f| f.name.as_str()).unwrap_or_default();
        let args = constants.iter().map(|c| c.debug_string()).collect::<Vec<_>>().join("_");
        self.specialized_name_format
            .replace("{name}", name)
            .replace("{args}", &args)
            .replace("{index}", &index.to_string())
    }

    /// A namer for [`crate::fix_specialize::apply_specialization`].
    pub fn namer<'a>(&'a self, group: &'a FixGroup, constants: &'a [TermPtr]) -> impl Fn(usize) -> String + 'a {
        move |index| self.specialized_name(group, index, constants)
    }
}
