//! Module-level exports: the standalone functions and the package version.

use crate::dispatcher::Dispatcher;
use crate::ops::{Hello, HelloAsync, HelloPromise};

/// Package version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Standalone functions: `hello`, `hello_async`, `hello_promise`
pub fn exports() -> Dispatcher {
    Dispatcher::new()
        .with(Hello)
        .with(HelloAsync::new())
        .with(HelloPromise)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Args;
    use skel_runtime::{EventLoop, PoolConfig};
    use skel_types::Value;

    #[test]
    fn test_exports() {
        let exports = exports();
        assert_eq!(exports.names(), vec!["hello", "hello_async", "hello_promise"]);
        assert_eq!(
            exports.call_sync("hello", &Args::new()).unwrap(),
            Value::from("hello world")
        );
        assert!(!VERSION.is_empty());
    }

    #[tokio::test]
    async fn test_hello_promise_by_name() {
        let lp = EventLoop::new(PoolConfig::new(1).unwrap()).unwrap();
        let opts = Value::object_from_pairs([("phrase", Value::from("hi")), ("multiply", Value::from(3))]);
        let promise = exports()
            .call_promise(&lp, "hello_promise", &Args::new().with(opts))
            .unwrap();
        let (_, outcome) = tokio::join!(lp.run(), promise);
        assert_eq!(outcome, Ok(Value::from("hihihi")));
    }
}
