use std::env;

// Kernel families that can be compiled into this crate
#[derive(PartialEq, Eq, Debug)]
struct KernelFamily {
    name: &'static str,
    target_arches: &'static [&'static str],
    cfg_flag: &'static str,
}

impl KernelFamily {
    // Groups all vector kernel families known to this crate.
    // The generic kernel is not listed: it is always compiled.
    fn families() -> Vec<KernelFamily> {
        vec![KernelFamily {
            name: "sse",
            target_arches: &["x86", "x86_64"],
            cfg_flag: "sse_kernels",
        }]
    }

    fn supports(&self, target_arch: &str) -> bool {
        self.target_arches.contains(&target_arch)
    }
}

// Opt-out switch: build the reference kernel only
const SCALAR_ONLY_ENV: &str = "SIMDPOW_SCALAR_ONLY";

fn scalar_only() -> bool {
    match env::var(SCALAR_ONLY_ENV) {
        Ok(value) => matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => false,
    }
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed={SCALAR_ONLY_ENV}");

    // Disable flag warnings for build
    for family in KernelFamily::families() {
        println!("cargo::rustc-check-cfg=cfg({})", family.cfg_flag);
    }

    // Cross compilation: CARGO_CFG_TARGET_ARCH describes the target, not the host
    let target_arch = env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default();

    let mut compiled = vec!["generic"];

    if scalar_only() {
        println!("cargo:warning=simdpow: {SCALAR_ONLY_ENV} set, building the generic kernel only");
    } else {
        for family in KernelFamily::families() {
            if family.supports(&target_arch) {
                println!("cargo:rustc-cfg={}", family.cfg_flag);
                compiled.push(family.name);
            }
        }
    }

    // Exposed to the crate as `COMPILED_FAMILIES`
    println!(
        "cargo:rustc-env=SIMDPOW_COMPILED_FAMILIES={}",
        compiled.join(",")
    );
}
