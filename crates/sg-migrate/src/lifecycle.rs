//! Notifications the coordinator sends once the schema is confirmed current.

/// Receives the "schema is current, continue starting" signal.
pub trait PlatformStartup: Send + Sync {
    fn platform_started(&self);
}

/// Registers plugin-contributed web services.
///
/// Called at most once per setup or upgrade cycle, and only when the schema
/// is up to date.
pub trait PluginServices: Send + Sync {
    fn load_plugin_web_services(&self);
}
