use mockgen_model::{Extractor, GenerationRequest, MockgenError, TypeRef};
use mockgen_reflect::ReflectExtractor;
use std::fs;
use tempfile::TempDir;

const ARCHIVE: &str = r#"{
  "path": "example.com/hello",
  "decls": {
    "Helloer": {
      "kind": "interface",
      "methods": [
        {"name": "Hello", "results": [{"kind": "named", "name": "string"}]}
      ]
    },
    "Watcher": {
      "kind": "interface",
      "methods": [
        {
          "name": "Watch",
          "params": [{"kind": "named", "package": "time", "name": "Duration"}],
          "results": [{"kind": "chan", "dir": "recv", "elem": {"kind": "named", "package": "example.com/hello", "name": "Event"}}]
        },
        {
          "name": "Stop",
          "params": [{"kind": "func", "params": [{"kind": "interface"}], "results": []}]
        }
      ]
    }
  }
}"#;

fn request(dir: &TempDir, interfaces: &[&str]) -> GenerationRequest {
    let archive = dir.path().join("hello.archive.json");
    fs::write(&archive, ARCHIVE).expect("write archive");
    GenerationRequest::reflect(
        "example.com/hello",
        Some(archive),
        interfaces.iter().map(|s| s.to_string()).collect(),
        "mock_hello",
        dir.path().join("mock.go"),
    )
}

#[test]
fn reads_interfaces_in_request_order() {
    let dir = TempDir::new().unwrap();
    let out = ReflectExtractor::new()
        .extract(&request(&dir, &["Watcher", "Helloer"]))
        .expect("extract");
    let order: Vec<_> = out.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(order, vec!["Watcher", "Helloer"]);

    let watch = out[0].method("Watch").unwrap();
    assert_eq!(watch.params()[0].ty, TypeRef::imported("time", "Duration"));
    let stop = out[0].method("Stop").unwrap();
    assert!(matches!(stop.params()[0].ty, TypeRef::Func(_)));
    assert_eq!(out[1].method("Hello").unwrap().results(), &[TypeRef::builtin("string")]);
}

#[test]
fn missing_archive_file_is_an_archive_error() {
    let dir = TempDir::new().unwrap();
    let mut req = request(&dir, &["Helloer"]);
    if let mockgen_model::Target::Reflect { archive, .. } = &mut req.target {
        *archive = Some(dir.path().join("absent.json"));
    }
    let err = ReflectExtractor::new().extract(&req).unwrap_err();
    assert!(matches!(err, MockgenError::Archive { .. }), "{err}");
}
