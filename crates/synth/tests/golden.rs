use mockgen_model::{GenerationRequest, InterfaceDescriptor, MethodDescriptor, TypeRef};
use mockgen_synth::{comment_each_line, inject_header, strip_header, synthesize};
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;

fn interface(package: &str, name: &str, methods: Vec<MethodDescriptor>) -> InterfaceDescriptor {
    InterfaceDescriptor {
        package_path: package.to_string(),
        name: name.to_string(),
        methods,
        embedded: BTreeSet::new(),
    }
}

fn simple_one() -> InterfaceDescriptor {
    interface(
        "",
        "simpleOne",
        vec![MethodDescriptor::new(
            "Hello",
            vec![],
            vec![TypeRef::builtin("string")],
            false,
        )],
    )
}

const SIMPLE_ONE: &str = r#"// Code generated by MockGen. DO NOT EDIT.
// Source: hello.go

// Package mock_hello is a generated GoMock package.
package mock_hello

import (
	gomock "github.com/golang/mock/gomock"
	reflect "reflect"
)

// MocksimpleOne is a mock of simpleOne interface.
type MocksimpleOne struct {
	ctrl     *gomock.Controller
	recorder *MocksimpleOneMockRecorder
}

// MocksimpleOneMockRecorder is the mock recorder for MocksimpleOne.
type MocksimpleOneMockRecorder struct {
	mock *MocksimpleOne
}

// NewMocksimpleOne creates a new mock instance.
func NewMocksimpleOne(ctrl *gomock.Controller) *MocksimpleOne {
	mock := &MocksimpleOne{ctrl: ctrl}
	mock.recorder = &MocksimpleOneMockRecorder{mock}
	return mock
}

// EXPECT returns an object that allows the caller to indicate expected use.
func (m *MocksimpleOne) EXPECT() *MocksimpleOneMockRecorder {
	return m.recorder
}

// Hello mocks base method.
func (m *MocksimpleOne) Hello() string {
	m.ctrl.T.Helper()
	ret := m.ctrl.Call(m, "Hello")
	ret0, _ := ret[0].(string)
	return ret0
}

// Hello indicates an expected call of Hello.
func (mr *MocksimpleOneMockRecorder) Hello() *gomock.Call {
	mr.mock.ctrl.T.Helper()
	return mr.mock.ctrl.RecordCallWithMethodType(mr.mock, "Hello", reflect.TypeOf((*MocksimpleOne)(nil).Hello))
}
"#;

fn hello_request(interfaces: &[&str]) -> GenerationRequest {
    GenerationRequest::source(
        "hello.go",
        interfaces.iter().map(|s| s.to_string()).collect(),
        "mock_hello",
        "mock_hello/mock.go",
    )
}

#[test]
fn simple_one_matches_golden_output() {
    let unit = synthesize(&hello_request(&["simpleOne"]), &[simple_one()]).unwrap();
    assert_eq!(unit.render(), SIMPLE_ONE);
    assert_eq!(unit.body(), SIMPLE_ONE);
}

#[test]
fn reflect_service_method_keeps_signature() {
    let service = interface(
        "example.com/svc",
        "FooerService",
        vec![MethodDescriptor::new(
            "DoIt",
            vec![
                TypeRef::imported("context", "Context"),
                TypeRef::local("Request").pointer(),
            ],
            vec![TypeRef::local("Response").pointer(), TypeRef::builtin("error")],
            false,
        )],
    );
    let request = GenerationRequest::reflect(
        "example.com/svc",
        None,
        vec!["FooerService".into()],
        "mock_svc",
        "mock_svc/mock.go",
    );
    let out = synthesize(&request, &[service]).unwrap().render();

    assert!(out.contains("// Source: example.com/svc (interfaces: FooerService)\n"));
    assert!(out.contains(
        "import (\n\tcontext \"context\"\n\tsvc \"example.com/svc\"\n\tgomock \"github.com/golang/mock/gomock\"\n\treflect \"reflect\"\n)\n"
    ));
    assert!(out.contains(
        "func (m *MockFooerService) DoIt(arg0 context.Context, arg1 *svc.Request) (*svc.Response, error) {\n"
    ));
    assert!(out.contains("\tret0, _ := ret[0].(*svc.Response)\n\tret1, _ := ret[1].(error)\n"));
    assert!(out.contains(
        "func (mr *MockFooerServiceMockRecorder) DoIt(arg0, arg1 interface{}) *gomock.Call {\n"
    ));
}

#[test]
fn self_package_types_are_not_imported() {
    let service = interface(
        "example.com/svc",
        "Store",
        vec![MethodDescriptor::new(
            "Put",
            vec![TypeRef::local("Item")],
            vec![],
            false,
        )],
    );
    let mut request = hello_request(&["Store"]);
    request.self_package = Some("example.com/svc".into());
    let out = synthesize(&request, &[service]).unwrap().render();
    assert!(!out.contains("\"example.com/svc\""));
    assert!(out.contains("Put(arg0 Item) {\n"));
    assert!(out.contains("\tm.ctrl.Call(m, \"Put\", arg0)\n}\n"));
}

#[test]
fn mocks_follow_request_order_and_names() {
    let a = interface("", "A", vec![MethodDescriptor::new("Run", vec![], vec![], false)]);
    let b = interface("", "B", vec![]);
    let c = interface("", "C", vec![]);
    let mut request = hello_request(&["C", "A", "B"]);
    request.mock_names.insert("A".into(), "FakeA".into());

    let unit = synthesize(&request, &[c, a, b]).unwrap();
    let names: Vec<_> = unit.mocks.iter().map(|m| m.mock_name.as_str()).collect();
    assert_eq!(names, vec!["MockC", "FakeA", "MockB"]);

    let out = unit.render();
    let pos = |needle: &str| out.find(needle).unwrap();
    assert!(pos("type MockC struct") < pos("type FakeA struct"));
    assert!(pos("type FakeA struct") < pos("type MockB struct"));
}

#[test]
fn generation_is_deterministic() {
    let first = synthesize(&hello_request(&["simpleOne"]), &[simple_one()]).unwrap();
    let second = synthesize(&hello_request(&["simpleOne"]), &[simple_one()]).unwrap();
    assert_eq!(first.render(), second.render());
}

#[test]
fn two_line_copyright_is_prepended_verbatim() {
    let template = "Copyright 2020 Example Authors\nSPDX-License-Identifier: Apache-2.0\n";
    let unit = synthesize(&hello_request(&["simpleOne"]), &[simple_one()]).unwrap();
    let body = unit.body();
    let out = inject_header(unit, Some(template)).render();

    let lines: Vec<_> = out.lines().take(3).collect();
    assert_eq!(
        lines,
        vec![
            "// Copyright 2020 Example Authors",
            "// SPDX-License-Identifier: Apache-2.0",
            "// Code generated by MockGen. DO NOT EDIT.",
        ]
    );
    assert_eq!(out, format!("{}{body}", comment_each_line(template)));
    assert_eq!(strip_header(&out, template).unwrap(), body);
}
