use log::*;

/// Loads `.env.test` if present and initialises logging. Safe to call from every test.
pub fn prepare_test_env() {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    trace!("🚀️ Logging initialised");
}

/// A random hex id, shaped like the ids the store hands out.
pub fn random_id() -> String {
    format!("{:016x}{:016x}", rand::random::<u64>(), rand::random::<u64>())
}
