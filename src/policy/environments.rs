//! Predefined global symbol sets enabled by `env` flags.

use crate::config::GlobalAccess;
use crate::config::GlobalAccess::{Readonly as R, Writable as W};

pub type Globals = &'static [(&'static str, GlobalAccess)];

const BUILTIN_ES5: Globals = &[
    ("Array", R),
    ("Boolean", R),
    ("Date", R),
    ("decodeURI", R),
    ("decodeURIComponent", R),
    ("encodeURI", R),
    ("encodeURIComponent", R),
    ("Error", R),
    ("eval", R),
    ("Function", R),
    ("Infinity", R),
    ("isFinite", R),
    ("isNaN", R),
    ("JSON", R),
    ("Math", R),
    ("NaN", R),
    ("Number", R),
    ("Object", R),
    ("parseFloat", R),
    ("parseInt", R),
    ("RegExp", R),
    ("String", R),
    ("undefined", R),
];

const ES2015: Globals = &[
    ("ArrayBuffer", R),
    ("DataView", R),
    ("Float32Array", R),
    ("Float64Array", R),
    ("Int8Array", R),
    ("Int16Array", R),
    ("Int32Array", R),
    ("Map", R),
    ("Promise", R),
    ("Proxy", R),
    ("Reflect", R),
    ("Set", R),
    ("Symbol", R),
    ("Uint8Array", R),
    ("Uint8ClampedArray", R),
    ("Uint16Array", R),
    ("Uint32Array", R),
    ("WeakMap", R),
    ("WeakSet", R),
];

const ES2017: Globals = &[("Atomics", R), ("SharedArrayBuffer", R)];

const ES2020: Globals = &[
    ("BigInt", R),
    ("BigInt64Array", R),
    ("BigUint64Array", R),
    ("globalThis", R),
];

const ES2021: Globals = &[
    ("AggregateError", R),
    ("FinalizationRegistry", R),
    ("WeakRef", R),
];

const BROWSER: Globals = &[
    ("alert", R),
    ("Blob", R),
    ("cancelAnimationFrame", R),
    ("clearInterval", R),
    ("clearTimeout", R),
    ("console", R),
    ("CustomEvent", R),
    ("document", R),
    ("Element", R),
    ("Event", R),
    ("fetch", R),
    ("FormData", R),
    ("Headers", R),
    ("history", R),
    ("HTMLElement", R),
    ("localStorage", R),
    ("location", W),
    ("navigator", R),
    ("onload", W),
    ("requestAnimationFrame", R),
    ("Request", R),
    ("Response", R),
    ("sessionStorage", R),
    ("setInterval", R),
    ("setTimeout", R),
    ("URL", R),
    ("URLSearchParams", R),
    ("WebSocket", R),
    ("window", R),
    ("XMLHttpRequest", R),
];

const WORKER: Globals = &[
    ("close", R),
    ("importScripts", R),
    ("onmessage", W),
    ("postMessage", R),
    ("self", R),
];

const NODE: Globals = &[
    ("__dirname", R),
    ("__filename", R),
    ("Buffer", R),
    ("clearImmediate", R),
    ("clearInterval", R),
    ("clearTimeout", R),
    ("console", R),
    ("exports", W),
    ("global", R),
    ("module", R),
    ("process", R),
    ("require", R),
    ("setImmediate", R),
    ("setInterval", R),
    ("setTimeout", R),
    ("URL", R),
    ("URLSearchParams", R),
];

const COMMONJS: Globals = &[
    ("exports", W),
    ("global", R),
    ("module", R),
    ("require", R),
];

const SHARED_NODE_BROWSER: Globals = &[
    ("clearInterval", R),
    ("clearTimeout", R),
    ("console", R),
    ("setInterval", R),
    ("setTimeout", R),
    ("URL", R),
    ("URLSearchParams", R),
];

const JEST: Globals = &[
    ("afterAll", R),
    ("afterEach", R),
    ("beforeAll", R),
    ("beforeEach", R),
    ("describe", R),
    ("expect", R),
    ("fit", R),
    ("it", R),
    ("jest", R),
    ("test", R),
    ("xdescribe", R),
    ("xit", R),
    ("xtest", R),
];

const MOCHA: Globals = &[
    ("after", R),
    ("afterEach", R),
    ("before", R),
    ("beforeEach", R),
    ("context", R),
    ("describe", R),
    ("it", R),
    ("mocha", R),
    ("run", R),
    ("setup", R),
    ("specify", R),
    ("suite", R),
    ("teardown", R),
    ("test", R),
    ("xcontext", R),
    ("xdescribe", R),
    ("xit", R),
];

/// Global sets contributed by `name`, or `None` for an unknown environment.
///
/// ECMAScript version environments are cumulative: `es2020` includes every
/// global introduced since ES5.
pub fn globals(name: &str) -> Option<Vec<Globals>> {
    let sets: Vec<Globals> = match name {
        "builtin" => vec![BUILTIN_ES5],
        "es6" | "es2015" | "es2016" => vec![BUILTIN_ES5, ES2015],
        "es2017" | "es2018" | "es2019" => vec![BUILTIN_ES5, ES2015, ES2017],
        "es2020" => vec![BUILTIN_ES5, ES2015, ES2017, ES2020],
        "es2021" | "es2022" => vec![BUILTIN_ES5, ES2015, ES2017, ES2020, ES2021],
        "browser" => vec![BROWSER],
        "worker" => vec![WORKER],
        "node" => vec![NODE],
        "commonjs" => vec![COMMONJS],
        "shared-node-browser" => vec![SHARED_NODE_BROWSER],
        "jest" => vec![JEST],
        "mocha" => vec![MOCHA],
        _ => return None,
    };
    Some(sets)
}

pub fn is_known(name: &str) -> bool {
    globals(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contains(name: &str, symbol: &str) -> bool {
        globals(name)
            .unwrap()
            .iter()
            .any(|set| set.iter().any(|(g, _)| *g == symbol))
    }

    #[test]
    fn es_versions_are_cumulative() {
        assert!(contains("es2020", "globalThis"));
        assert!(contains("es2020", "Promise"));
        assert!(contains("es2020", "JSON"));
        assert!(!contains("es6", "globalThis"));
    }

    #[test]
    fn node_exports_is_writable() {
        let node = globals("node").unwrap();
        let access = node[0].iter().find(|(g, _)| *g == "exports").map(|(_, a)| *a);
        assert_eq!(access, Some(GlobalAccess::Writable));
    }

    #[test]
    fn unknown_environment() {
        assert!(!is_known("amiga"));
        assert!(is_known("browser"));
    }
}
