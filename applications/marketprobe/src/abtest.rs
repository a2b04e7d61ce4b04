//! Console front end for the A/B variant store.

use crate::args::AbTestCommand;
use marketpulse::variant::{Variant, VariantStore};
use std::io::Write;

pub fn list(store: &VariantStore, out: &mut dyn Write) -> anyhow::Result<()> {
    let current = store.current();

    writeln!(out, "\n📊 Available Versions:\n")?;
    for variant in Variant::ALL {
        let profile = variant.profile();
        let marker = if variant == current { "🟢" } else { "⚪" };

        writeln!(out, "{} {}", marker, profile.name)?;
        writeln!(out, "   Port: {}", profile.port)?;
        writeln!(out, "   Description: {}", profile.description)?;
        writeln!(out, "   Build Directory: {}", profile.build_dir)?;
        writeln!(out, "   Index File: {}\n", profile.index_file)?;
    }

    Ok(())
}

pub fn status(store: &VariantStore, out: &mut dyn Write) -> anyhow::Result<()> {
    writeln!(out, "\n🔍 Checking Build Status:\n")?;

    for build in store.build_status()? {
        let marker = if build.built { "✅" } else { "❌" };

        writeln!(out, "{} {}", marker, build.variant.profile().name)?;
        writeln!(out, "   Build Directory: {}", build.path.display())?;
        writeln!(
            out,
            "   Status: {}",
            if build.built { "Built" } else { "Not built" }
        )?;
        if build.built {
            writeln!(out, "   Files: {} files", build.files)?;
        }
        writeln!(out)?;
    }

    Ok(())
}

pub fn switch(store: &VariantStore, version: Option<&str>, out: &mut dyn Write) -> anyhow::Result<()> {
    match version.map(str::parse::<Variant>) {
        Some(Ok(variant)) => {
            store.switch(variant)?;
            writeln!(out, "✅ Switched to {} version", variant.profile().name)?;
        }
        _ => {
            writeln!(out, "❌ Invalid version. Use \"original\" or \"ai\"")?;
            let available: Vec<&str> = Variant::ALL.iter().map(|variant| variant.as_str()).collect();
            writeln!(out, "Available versions: {}", available.join(", "))?;
        }
    }

    Ok(())
}

pub fn report(store: &VariantStore, out: &mut dyn Write) -> anyhow::Result<()> {
    let profile = store.current().profile();

    writeln!(out, "\n📈 A/B Test Report:\n")?;
    writeln!(out, "Current Active Version: {}", profile.name)?;
    writeln!(out, "Port: {}", profile.port)?;
    writeln!(out, "Description: {}", profile.description)?;

    let builds = store.build_status()?;
    let built = |variant: Variant| builds.iter().any(|b| b.variant == variant && b.built);
    let label = |ready: bool| if ready { "✅ Built" } else { "❌ Not built" };

    writeln!(out, "\nBuild Status:")?;
    writeln!(out, "  Original: {}", label(built(Variant::Original)))?;
    writeln!(out, "  AI Version: {}", label(built(Variant::Ai)))?;

    if built(Variant::Original) && built(Variant::Ai) {
        writeln!(out, "\n🎉 Both versions are ready for A/B testing!")?;
        writeln!(out, "\nTo test:")?;
        writeln!(out, "  Original: {}", Variant::Original.local_url())?;
        writeln!(out, "  AI Version: {}", Variant::Ai.local_url())?;
    } else {
        writeln!(out, "\n⚠️  Please build both versions first:")?;
        writeln!(out, "  npm run build && npm run build:ai")?;
    }

    Ok(())
}

pub fn help(store: &VariantStore, out: &mut dyn Write) -> anyhow::Result<()> {
    writeln!(out, "\n🚀 Market Pulse A/B Testing Manager\n")?;
    writeln!(out, "Usage: abtest [--root <dir>] [command]\n")?;
    writeln!(out, "Commands:")?;
    writeln!(out, "  list                    List all available versions")?;
    writeln!(out, "  status                  Check build status of all versions")?;
    writeln!(out, "  switch <version>        Switch to specified version (original|ai)")?;
    writeln!(out, "  report                  Generate A/B test report")?;
    writeln!(out, "  help                    Show this help message\n")?;
    writeln!(out, "Examples:")?;
    writeln!(out, "  abtest list")?;
    writeln!(out, "  abtest switch ai")?;
    writeln!(out, "  abtest status")?;
    writeln!(out, "  abtest report\n")?;
    writeln!(out, "Current Version: {}", store.current().profile().name)?;

    Ok(())
}

pub fn run(store: &VariantStore, command: Option<&AbTestCommand>, out: &mut dyn Write) -> anyhow::Result<()> {
    match command {
        Some(AbTestCommand::List) => list(store, out),
        Some(AbTestCommand::Status) => status(store, out),
        Some(AbTestCommand::Switch { version }) => switch(store, version.as_deref(), out),
        Some(AbTestCommand::Report) => report(store, out),
        Some(AbTestCommand::Help) | None => help(store, out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use temp_dir::TempDir;

    fn output(store: &VariantStore, command: AbTestCommand) -> String {
        let mut out = Vec::new();
        run(store, Some(&command), &mut out).expect("command failed");
        String::from_utf8(out).expect("invalid utf-8")
    }

    #[test]
    fn test_switch_then_list_marks_ai_active() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let store = VariantStore::new(dir.path());

        let switched = output(
            &store,
            AbTestCommand::Switch {
                version: Some("ai".to_string()),
            },
        );
        assert!(switched.contains("✅ Switched to AI Enhanced version"));

        let restarted = VariantStore::new(dir.path());
        let listed = output(&restarted, AbTestCommand::List);

        assert!(listed.contains("🟢 AI Enhanced"));
        assert!(listed.contains("⚪ Original"));
    }

    #[test]
    fn test_switch_rejects_unknown_version() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let store = VariantStore::new(dir.path());

        let text = output(
            &store,
            AbTestCommand::Switch {
                version: Some("beta".to_string()),
            },
        );

        assert!(text.contains("❌ Invalid version. Use \"original\" or \"ai\""));
        assert!(text.contains("Available versions: original, ai"));
        assert_eq!(store.current(), Variant::Original);
        assert!(!store.version_file().exists());
    }

    #[test]
    fn test_report_with_both_builds() {
        let dir = TempDir::new().expect("failed to create temp dir");
        fs::create_dir(dir.path().join("dist")).expect("failed to create dist");
        fs::create_dir(dir.path().join("dist-ai")).expect("failed to create dist-ai");
        let store = VariantStore::new(dir.path());

        let text = output(&store, AbTestCommand::Report);

        assert!(text.contains("Current Active Version: Original"));
        assert!(text.contains("🎉 Both versions are ready for A/B testing!"));
        assert!(text.contains("AI Version: http://localhost:3002"));
    }

    #[test]
    fn test_status_without_builds() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let store = VariantStore::new(dir.path());

        let text = output(&store, AbTestCommand::Status);

        assert!(text.contains("❌ Original"));
        assert!(text.contains("Status: Not built"));
        assert!(!text.contains("Files:"));
    }

    #[test]
    fn test_help_is_default() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let store = VariantStore::new(dir.path());
        let mut out = Vec::new();

        run(&store, None, &mut out).expect("help failed");

        let text = String::from_utf8(out).expect("invalid utf-8");
        assert!(text.contains("Current Version: Original"));
    }
}
