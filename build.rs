const LIST_SERVICE_PROTO: &str = "proto/list_service.proto";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // The controller only needs the client; the server is generated for
    // the in-process list service used by tests.
    tonic_build::configure()
        .build_client(true)
        .build_server(true)
        .compile_protos(&[LIST_SERVICE_PROTO], &["proto"])?;

    println!("cargo:rerun-if-changed={LIST_SERVICE_PROTO}");
    Ok(())
}
