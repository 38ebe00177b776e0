use config::Source;

pub mod core_config;

/// Layers user sources over the defaults embedded in a crate.
pub trait ConfigBuilder: Sized {
    type C;

    fn add_source<T>(self, source: T) -> anyhow::Result<Self>
        where
            T: Source + Send + Sync + 'static;

    fn build(self) -> anyhow::Result<Self::C>;
}
