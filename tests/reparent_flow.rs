//! End-to-end pipeline tests
//!
//! These drive `cli::run` with scripted console input against layers in a
//! temporary directory, covering:
//! - Default prim already present, auto-assigned, and chosen interactively
//! - Failures that must not write an output layer
//! - Overwrite behaviour and repeatability

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use scope_reparent::cli;
use scope_reparent::console::Terminal;
use scope_reparent::constants::{EXIT_FAILURE, EXIT_SUCCESS, PROMPT_DEFAULT_PRIM};
use tempfile::TempDir;

const WITH_DEFAULT: &str = r#"#usda 1.0
(
    defaultPrim = "World"
    upAxis = "Y"
)

def Xform "World"
{
    def Mesh "ground"
    {
    }
}
"#;

const SINGLE_CHILD: &str = r#"#usda 1.0
(
    upAxis = "Y"
)

def Xform "HoudiniLayerInfo" (
    customData = {
        string HoudiniCreatorNode = "/stage/usd_rop1"
    }
)
{
}

def Xform "Geo"
{
}
"#;

const TWO_CHILDREN: &str = r#"#usda 1.0

def Xform "GeoA"
{
}

def Xform "MetadataInfo"
{
}

def Xform "GeoB"
{
}
"#;

const EXPECTED_ASSEMBLY: &str = "#usda 1.0

def Scope \"assembly\" (
    kind = \"group\"
    prepend references = @./scene.usda@
)
{
}
";

struct Run {
    status: u8,
    stdout: String,
    stderr: String,
}

/// Fixture directory with an empty config so the user's config is ignored.
struct Fixture {
    dir: TempDir,
    config: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let config = dir.path().join("config.toml");
        fs::write(&config, "").expect("Failed to write config");
        Self { dir, config }
    }

    fn layer(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).expect("Failed to write layer");
        path
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn run(&self, args: &[&str], input: &str) -> Run {
        let mut argv = vec![
            "scope_reparent".to_string(),
            "--config".to_string(),
            self.config.display().to_string(),
        ];
        argv.extend(args.iter().map(ToString::to_string));

        let mut console = Terminal::new(Cursor::new(input.to_string()), Vec::new(), Vec::new());
        let status = cli::run(argv, &mut console);
        let (_, out, err) = console.into_parts();
        Run {
            status,
            stdout: String::from_utf8(out).unwrap(),
            stderr: String::from_utf8(err).unwrap(),
        }
    }
}

fn arg(path: &Path) -> String {
    path.display().to_string()
}

#[test]
fn test_existing_default_prim_writes_container() {
    let fx = Fixture::new();
    let scene = fx.layer("scene.usda", WITH_DEFAULT);

    let run = fx.run(&[&arg(&scene), "assembly"], "");

    assert_eq!(run.status, EXIT_SUCCESS, "stderr: {}", run.stderr);
    assert!(run.stdout.is_empty());
    assert!(run.stderr.is_empty());
    assert_eq!(
        fs::read_to_string(fx.path("assembly.usda")).unwrap(),
        EXPECTED_ASSEMBLY
    );
    // Input untouched.
    assert_eq!(fs::read_to_string(&scene).unwrap(), WITH_DEFAULT);
}

#[test]
fn test_single_candidate_is_assigned_and_saved() {
    let fx = Fixture::new();
    let scene = fx.layer("scene.usda", SINGLE_CHILD);

    let run = fx.run(&[&arg(&scene), "assembly"], "");

    assert_eq!(run.status, EXIT_SUCCESS, "stderr: {}", run.stderr);
    assert!(run.stdout.is_empty(), "no prompt expected: {}", run.stdout);
    assert!(run.stderr.contains("has no default prim set"));

    let saved = fs::read_to_string(&scene).unwrap();
    assert!(saved.starts_with("#usda 1.0\n(\n    defaultPrim = \"Geo\"\n    upAxis = \"Y\"\n)\n"));
    assert!(saved.ends_with("def Xform \"Geo\"\n{\n}\n"));
    assert_eq!(
        fs::read_to_string(fx.path("assembly.usda")).unwrap(),
        EXPECTED_ASSEMBLY
    );
}

#[test]
fn test_multiple_candidates_prompt_for_selection() {
    let fx = Fixture::new();
    let scene = fx.layer("scene.usda", TWO_CHILDREN);

    let run = fx.run(&[&arg(&scene), "assembly"], "geo\n5\n1\n");

    assert_eq!(run.status, EXIT_SUCCESS, "stderr: {}", run.stderr);
    assert!(run.stdout.starts_with("Choose a default prim:\n0: GeoA\n1: GeoB\n"));
    assert!(run.stdout.contains("Invalid input. Please enter a number."));
    assert!(run
        .stdout
        .contains("Invalid selection. Please enter a number between 0 and 1."));
    assert_eq!(run.stdout.matches(PROMPT_DEFAULT_PRIM).count(), 3);

    let saved = fs::read_to_string(&scene).unwrap();
    assert!(saved.starts_with("#usda 1.0\n(\n    defaultPrim = \"GeoB\"\n)\n"));
    assert!(fx.path("assembly.usda").is_file());
}

#[test]
fn test_scope_name_prompted_when_omitted() {
    let fx = Fixture::new();
    let scene = fx.layer("scene.usda", WITH_DEFAULT);

    let run = fx.run(&[&arg(&scene)], "assembly\n");

    assert_eq!(run.status, EXIT_SUCCESS, "stderr: {}", run.stderr);
    assert_eq!(
        run.stdout,
        "Please enter the name of the scope prim you'd like to create: "
    );
    assert!(fx.path("assembly.usda").is_file());
}

#[test]
fn test_only_blacklisted_children_fails_without_writing() {
    let fx = Fixture::new();
    let contents = "#usda 1.0\n\ndef \"HoudiniLayerInfo\" {}\ndef \"MetadataInfo\" {}\n";
    let scene = fx.layer("scene.usda", contents);

    let run = fx.run(&[&arg(&scene), "assembly"], "");

    assert_eq!(run.status, EXIT_FAILURE);
    assert!(run.stderr.ends_with("has no valid child prims\n"));
    assert!(!fx.path("assembly.usda").exists());
    assert_eq!(fs::read_to_string(&scene).unwrap(), contents);
}

#[test]
fn test_custom_blacklist_from_config() {
    let fx = Fixture::new();
    fs::write(&fx.config, "[guarantor]\nblacklist = [\"GeoA\"]\n").unwrap();
    let scene = fx.layer("scene.usda", TWO_CHILDREN);

    // With GeoA blacklisted and MetadataInfo no longer blacklisted, there
    // are still two candidates.
    let run = fx.run(&[&arg(&scene), "assembly"], "0\n");

    assert_eq!(run.status, EXIT_SUCCESS, "stderr: {}", run.stderr);
    assert!(run.stdout.contains("0: MetadataInfo\n1: GeoB\n"));
    assert!(fs::read_to_string(&scene)
        .unwrap()
        .contains("defaultPrim = \"MetadataInfo\""));
}

#[test]
fn test_missing_input_fails() {
    let fx = Fixture::new();
    let missing = fx.path("missing.usda");

    let run = fx.run(&[&arg(&missing), "assembly"], "");

    assert_eq!(run.status, EXIT_FAILURE);
    assert!(run.stderr.starts_with("Error: Error opening USD stage from file"));
    assert_eq!(run.stderr.matches(&arg(&missing)).count(), 1, "{}", run.stderr);
    assert!(!fx.path("assembly.usda").exists());
}

#[test]
fn test_default_prim_on_override_is_kept() {
    let fx = Fixture::new();
    for contents in [
        "#usda 1.0\n(\n    defaultPrim = \"World\"\n)\n\nover \"World\"\n{\n}\n",
        "#usda 1.0\n(\n    defaultPrim = \"World\"\n)\n\ndef \"World\" (\n    active = false\n)\n{\n}\n",
    ] {
        let scene = fx.layer("scene.usda", contents);

        let run = fx.run(&[&arg(&scene), "assembly"], "");

        assert_eq!(run.status, EXIT_SUCCESS, "stderr: {}", run.stderr);
        assert!(run.stderr.is_empty());
        assert_eq!(fs::read_to_string(&scene).unwrap(), contents);
        assert_eq!(
            fs::read_to_string(fx.path("assembly.usda")).unwrap(),
            EXPECTED_ASSEMBLY
        );
    }
}

#[test]
fn test_reordered_root_prims() {
    let fx = Fixture::new();
    let contents = "#usda 1.0\n\nreorder rootPrims = [\"B\", \"A\"]\n\ndef \"A\"\n{\n}\n\ndef \"B\"\n{\n}\n";
    let scene = fx.layer("scene.usda", contents);

    let run = fx.run(&[&arg(&scene), "assembly"], "0\n");

    assert_eq!(run.status, EXIT_SUCCESS, "stderr: {}", run.stderr);
    assert!(run.stdout.starts_with("Choose a default prim:\n0: B\n1: A\n"));
    assert!(fs::read_to_string(&scene)
        .unwrap()
        .contains("defaultPrim = \"B\""));
}

#[test]
fn test_invalid_scope_name_leaves_input_untouched() {
    let fx = Fixture::new();
    let scene = fx.layer("scene.usda", SINGLE_CHILD);

    let run = fx.run(&[&arg(&scene), "has space"], "");

    assert_eq!(run.status, EXIT_FAILURE);
    assert!(run.stderr.contains("Failed to create Scope prim"));
    assert!(!run.stderr.contains("has no default prim set"));
    assert_eq!(fs::read_to_string(&scene).unwrap(), SINGLE_CHILD);
}

#[test]
fn test_usage_errors_touch_nothing() {
    let fx = Fixture::new();
    let scene = fx.layer("scene.usda", WITH_DEFAULT);

    for args in [vec![], vec![arg(&scene), "a".into(), "b".into()]] {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let run = fx.run(&args, "");
        assert_eq!(run.status, EXIT_FAILURE);
        assert_eq!(
            run.stderr,
            "Error: Usage: scope_reparent <usdFilePath> [scopeName]\n"
        );
    }
    let entries = fs::read_dir(fx.dir.path()).unwrap().count();
    assert_eq!(entries, 2, "only config.toml and scene.usda expected");
}

#[test]
fn test_invalid_prompted_name_is_rejected() {
    let fx = Fixture::new();
    let scene = fx.layer("scene.usda", WITH_DEFAULT);

    let run = fx.run(&[&arg(&scene)], "   \n");

    assert_eq!(run.status, EXIT_FAILURE);
    assert!(run.stderr.contains("Failed to create Scope prim"));
}

#[test]
fn test_repeat_runs_produce_identical_output() {
    let fx = Fixture::new();
    let scene = fx.layer("scene.usda", SINGLE_CHILD);

    assert_eq!(fx.run(&[&arg(&scene), "assembly"], "").status, EXIT_SUCCESS);
    let first = fs::read(fx.path("assembly.usda")).unwrap();
    let scene_after_first = fs::read(&scene).unwrap();

    let second_run = fx.run(&[&arg(&scene), "assembly"], "");
    assert_eq!(second_run.status, EXIT_SUCCESS);
    // Default prim already set on the second run.
    assert!(second_run.stderr.is_empty());
    assert_eq!(fs::read(fx.path("assembly.usda")).unwrap(), first);
    assert_eq!(fs::read(&scene).unwrap(), scene_after_first);
}

#[test]
fn test_no_clobber() {
    let fx = Fixture::new();
    let scene = fx.layer("scene.usda", WITH_DEFAULT);
    let existing = fx.layer("assembly.usda", "precious");

    let run = fx.run(&[&arg(&scene), "assembly", "--no-clobber"], "");

    assert_eq!(run.status, EXIT_FAILURE);
    assert!(run.stderr.contains("refusing to overwrite"));
    assert_eq!(fs::read_to_string(existing).unwrap(), "precious");
}
