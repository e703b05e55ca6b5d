use render::passes::ShaderKind;

fn validate(kind: ShaderKind) -> naga::Module {
    let module = naga::front::wgsl::parse_str(kind.embedded_source())
        .unwrap_or_else(|e| panic!("{} failed to parse: {e:?}", kind.file_name()));
    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .unwrap_or_else(|e| panic!("{} failed to validate: {e:?}", kind.file_name()));
    module
}

fn entry_points(module: &naga::Module) -> Vec<(&str, naga::ShaderStage)> {
    module
        .entry_points
        .iter()
        .map(|ep| (ep.name.as_str(), ep.stage))
        .collect()
}

#[test]
fn tube_shader_compiles() {
    let module = validate(ShaderKind::Tube);
    let eps = entry_points(&module);
    assert!(eps.contains(&("vs_main", naga::ShaderStage::Vertex)));
    assert!(eps.contains(&("fs_main", naga::ShaderStage::Fragment)));
}

#[test]
fn fullscreen_shaders_compile() {
    for kind in [ShaderKind::Blur, ShaderKind::Impulse] {
        let module = validate(kind);
        let eps = entry_points(&module);
        assert!(eps.contains(&("vs_fullscreen", naga::ShaderStage::Vertex)), "{kind:?}");
        assert!(eps.contains(&("fs_main", naga::ShaderStage::Fragment)), "{kind:?}");
    }
}

#[test]
fn shader_files_on_disk_match_embedded_sources() {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("src/shaders");
    for kind in ShaderKind::ALL {
        let on_disk = std::fs::read_to_string(dir.join(kind.file_name())).expect("read shader");
        assert_eq!(on_disk, kind.embedded_source());
    }
}
