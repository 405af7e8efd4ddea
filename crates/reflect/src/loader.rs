use crate::archive::PackageArchive;
use mockgen_model::{MockgenError, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const PROGRAM_TEMPLATE: &str = include_str!("program.go.tmpl");

/// Produces the package archive for a compiled library
pub trait PackageLoader {
    fn load(&self, library: &str, interfaces: &[String]) -> Result<PackageArchive>;
}

/// Reads a pre-built archive from disk
#[derive(Debug, Clone)]
pub struct ArchiveLoader {
    path: PathBuf,
}

impl ArchiveLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PackageLoader for ArchiveLoader {
    fn load(&self, library: &str, _interfaces: &[String]) -> Result<PackageArchive> {
        log::debug!("reading package archive {}", self.path.display());
        let archive = PackageArchive::load(&self.path)?;
        check_path(&archive, library, &self.path.display().to_string())?;
        Ok(archive)
    }
}

/// Builds and runs a reflect program against the library with the Go toolchain
#[derive(Debug, Clone)]
pub struct ProgramLoader {
    go: String,
    work_dir: Option<PathBuf>,
}

impl ProgramLoader {
    pub fn new(go: impl Into<String>) -> Self {
        Self {
            go: go.into(),
            work_dir: None,
        }
    }

    /// Directory the toolchain runs in (module root); defaults to the current one
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    /// Scratch directory inside the work dir, so the program builds within the
    /// caller's module; the system temp dir is the fallback
    fn scratch_dir(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("gomock_reflect_");
        let base = match &self.work_dir {
            Some(dir) => Some(dir.clone()),
            None => std::env::current_dir().ok(),
        };
        if let Some(base) = base {
            match builder.tempdir_in(&base) {
                Ok(dir) => return Ok(dir),
                Err(e) => log::debug!(
                    "cannot create scratch dir in {}: {e}; using system temp dir",
                    base.display()
                ),
            }
        }
        Ok(builder.tempdir()?)
    }
}

impl PackageLoader for ProgramLoader {
    fn load(&self, library: &str, interfaces: &[String]) -> Result<PackageArchive> {
        let scratch = self.scratch_dir()?;
        let program = scratch.path().join("main.go");
        let output = scratch.path().join("archive.json");
        std::fs::write(&program, render_program(library, interfaces))?;

        log::debug!(
            "running reflect program for {library} with {} ({})",
            self.go,
            program.display()
        );
        let mut command = Command::new(&self.go);
        command
            .arg("run")
            .arg(&program)
            .arg("-output")
            .arg(&output);
        if let Some(dir) = &self.work_dir {
            command.current_dir(dir);
        }
        let result = command.output().map_err(|e| {
            MockgenError::toolchain(format!("failed to start {}: {e}", self.go))
        })?;
        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            if let Some(err) = diagnose_failure(library, interfaces, &stderr) {
                return Err(err);
            }
            return Err(MockgenError::toolchain(format!(
                "reflect program for {library} failed ({}): {}",
                result.status,
                stderr.trim()
            )));
        }

        let archive = PackageArchive::load(&output)?;
        check_path(&archive, library, &display(&output))?;
        Ok(archive)
    }
}

/// Source of the reflect program for the given exported interfaces
pub fn render_program(library: &str, interfaces: &[String]) -> String {
    let entries: String = interfaces
        .iter()
        .map(|name| {
            format!("\t\t{{{name:?}, reflect.TypeOf((*pkg_.{name})(nil)).Elem()}},\n")
        })
        .collect();
    PROGRAM_TEMPLATE
        .replace("{{IMPORT_PATH}}", library)
        .replace("{{INTERFACES}}\n", &entries)
}

/// Map compiler diagnostics about the requested names onto extraction errors
fn diagnose_failure(library: &str, interfaces: &[String], stderr: &str) -> Option<MockgenError> {
    for name in interfaces {
        let qualified = format!("pkg_.{name}");
        for line in stderr.lines() {
            if mentions(line, &format!("undefined: {qualified}")) {
                return Some(MockgenError::not_found(name, library));
            }
            if mentions(line, &qualified) && line.contains("is not a type") {
                return Some(MockgenError::not_an_interface(name, "non-type declaration"));
            }
        }
    }
    None
}

/// Whether `line` contains `needle` as a whole identifier
fn mentions(line: &str, needle: &str) -> bool {
    line.match_indices(needle).any(|(at, _)| {
        !line[at + needle.len()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
    })
}

fn check_path(archive: &PackageArchive, library: &str, origin: &str) -> Result<()> {
    if archive.path != library {
        return Err(MockgenError::archive(
            origin,
            format!("describes package {}, expected {library}", archive.path),
        ));
    }
    Ok(())
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_lists_each_interface() {
        let program = render_program(
            "example.com/svc",
            &["FooerService".to_string(), "Other".to_string()],
        );
        assert!(program.contains("pkg_ \"example.com/svc\""));
        assert!(program.contains(
            "\t\t{\"FooerService\", reflect.TypeOf((*pkg_.FooerService)(nil)).Elem()},\n"
        ));
        assert!(program.contains("{\"Other\", reflect.TypeOf((*pkg_.Other)(nil)).Elem()}"));
        assert!(!program.contains("{{"));
    }

    #[test]
    fn archive_for_another_package_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.json");
        std::fs::write(&path, r#"{"path": "example.com/other", "decls": {}}"#).unwrap();
        let err = ArchiveLoader::new(&path)
            .load("example.com/svc", &[])
            .unwrap_err();
        assert!(err.to_string().contains("expected example.com/svc"), "{err}");
    }

    #[cfg(unix)]
    fn stub_go(dir: &Path, script: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("go");
        std::fs::write(&path, format!("#!/bin/sh\n{script}")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.display().to_string()
    }

    #[cfg(unix)]
    #[test]
    fn undefined_interface_is_not_found() {
        let bin = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let go = stub_go(
            bin.path(),
            "echo './main.go:95:30: undefined: pkg_.Missing' >&2\nexit 1\n",
        );
        let err = ProgramLoader::new(go)
            .with_work_dir(work.path())
            .load("example.com/svc", &["Fooer".to_string(), "Missing".to_string()])
            .unwrap_err();
        assert!(matches!(err, MockgenError::NotFound { .. }), "{err}");
        assert_eq!(err.interface(), Some("Missing"));
    }

    #[cfg(unix)]
    #[test]
    fn non_type_name_is_not_an_interface() {
        let bin = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let go = stub_go(
            bin.path(),
            "echo './main.go:95:30: pkg_.Default (variable of type int) is not a type' >&2\nexit 1\n",
        );
        let err = ProgramLoader::new(go)
            .with_work_dir(work.path())
            .load("example.com/svc", &["Default".to_string()])
            .unwrap_err();
        assert!(matches!(err, MockgenError::NotAnInterface { .. }), "{err}");
        assert_eq!(err.interface(), Some("Default"));
    }

    #[cfg(unix)]
    #[test]
    fn program_runs_inside_work_dir() {
        let bin = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let go = stub_go(
            bin.path(),
            r#"echo "$2" > "$PWD/program_path"
cat > "$4" <<'JSON'
{"path": "example.com/svc", "decls": {"Fooer": {"kind": "interface", "methods": [{"name": "Close", "results": [{"kind": "named", "name": "error"}]}]}}}
JSON
"#,
        );
        let archive = ProgramLoader::new(go)
            .with_work_dir(work.path())
            .load("example.com/svc", &["Fooer".to_string()])
            .unwrap();
        assert_eq!(archive.decl("Fooer").unwrap().methods[0].name, "Close");

        let program = std::fs::read_to_string(work.path().join("program_path")).unwrap();
        let program = Path::new(program.trim());
        let scratch = program.parent().unwrap();
        assert_eq!(scratch.parent(), Some(work.path()));
        assert!(scratch
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("gomock_reflect_"));
        assert!(!scratch.exists());
    }

    #[test]
    fn diagnostics_match_whole_names() {
        let stderr = "./main.go:12:3: undefined: pkg_.FooerService";
        assert!(diagnose_failure("example.com/svc", &["Fooer".to_string()], stderr).is_none());
        let err = diagnose_failure("example.com/svc", &["FooerService".to_string()], stderr).unwrap();
        assert_eq!(err.interface(), Some("FooerService"));
    }

    #[test]
    fn missing_toolchain_is_a_toolchain_error() {
        let err = ProgramLoader::new("definitely-not-a-go-binary")
            .load("example.com/svc", &["Fooer".to_string()])
            .unwrap_err();
        assert!(matches!(err, MockgenError::Toolchain(_)), "{err}");
    }
}
