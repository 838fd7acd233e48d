use pdbcomplex::engine::config::DEFAULT_ID_PREFIX;

pub struct DefaultsConfig {
    pub id_prefix: String,
    pub preferred_assemblies_only: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
            preferred_assemblies_only: true,
        }
    }
}
