fn main() {
    println!("cargo:rerun-if-env-changed=ZEROCLAW_BOARD");

    // Host builds have no ESP-IDF sysenv to export.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
