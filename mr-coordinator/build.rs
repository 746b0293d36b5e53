fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Compile the proto file via `prost`, generating service stubs
    // and proto definitions for use with `tonic`.
    // Point tonic-build at a vendored protoc so the build does not depend on
    // a system-installed protobuf compiler.
    if std::env::var_os("PROTOC").is_none() {
        if let Ok(protoc) = protoc_bin_vendored::protoc_bin_path() {
            std::env::set_var("PROTOC", protoc);
        }
    }
    tonic_build::compile_protos("../protos/coordinator.proto")?;
    Ok(())
}
