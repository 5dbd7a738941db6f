use ncview_tui::core::handlers::{STRUCTURED_PRIORITY, render_text};
use ncview_tui::core::{
    CapabilityRegistry, FileContent, HandlerDescriptor, RegistryBuilder, RenderOptions,
};
use std::path::Path;

#[test]
fn builtin_registry_resolves_known_extensions() -> Result<(), Box<dyn std::error::Error>> {
    let registry = CapabilityRegistry::builtin(512);
    assert_eq!(registry.resolve(Path::new("report.CSV"), b"")?.name(), "csv");
    assert_eq!(registry.resolve(Path::new("a.json"), b"")?.name(), "json");
    assert_eq!(registry.resolve(Path::new("notes.md"), b"")?.name(), "markdown");
    assert_eq!(registry.resolve(Path::new("Cargo.toml"), b"")?.name(), "toml");
    assert_eq!(registry.resolve(Path::new("ci.yml"), b"")?.name(), "yaml");
    Ok(())
}

#[test]
fn unknown_extensions_use_the_content_heuristic() -> Result<(), Box<dyn std::error::Error>> {
    let registry = CapabilityRegistry::builtin(512);
    let text = registry.resolve(Path::new("README"), b"plain words\n")?;
    assert_eq!(text.name(), "text");

    let binary = registry.resolve(Path::new("blob.bin"), b"\x7fELF\x00\x01")?;
    assert_eq!(binary.name(), "fallback");
    Ok(())
}

#[test]
fn higher_priority_wins_and_ties_keep_registration_order() -> Result<(), Box<dyn std::error::Error>>
{
    let registry = RegistryBuilder::new()
        .register(HandlerDescriptor::new("first", &["log"], 1, render_text))
        .register(HandlerDescriptor::new("second", &["log"], 1, render_text))
        .register(HandlerDescriptor::new(
            "structured",
            &["dat"],
            STRUCTURED_PRIORITY,
            render_text,
        ))
        .register(HandlerDescriptor::new("plain", &["dat"], 0, render_text))
        .build();

    assert_eq!(registry.resolve(Path::new("x.log"), b"")?.name(), "first");
    assert_eq!(registry.resolve(Path::new("x.dat"), b"")?.name(), "structured");
    Ok(())
}

#[test]
fn compound_extension_beats_trailing_extension() -> Result<(), Box<dyn std::error::Error>> {
    let registry = RegistryBuilder::new()
        .register(HandlerDescriptor::new("gzip", &["gz"], 50, render_text))
        .register(HandlerDescriptor::new("tarball", &["tar.gz"], 0, render_text))
        .build();

    assert_eq!(registry.resolve(Path::new("dump.tar.gz"), b"")?.name(), "tarball");
    assert_eq!(registry.resolve(Path::new("dump.gz"), b"")?.name(), "gzip");
    Ok(())
}

#[test]
fn registry_without_defaults_reports_no_handler() {
    let registry = RegistryBuilder::new().build();
    assert!(registry.resolve(Path::new("mystery"), b"abc").is_err());
}

#[test]
fn resolved_handler_renders_content() -> Result<(), Box<dyn std::error::Error>> {
    let registry = CapabilityRegistry::builtin(512);
    let content = FileContent::from_bytes("people.csv", "name,age\nada,36\nalan,41\n");
    let handler = registry.resolve(&content.path, &content.bytes)?;
    let view = handler.render(&content, &RenderOptions::default());
    assert_eq!(view.handler, "csv");
    assert!(view.lines.iter().any(|l| l.contains("ada")));
    Ok(())
}
