use crate::render::{param_list, TypeRenderer};
use crate::writer::GoWriter;
use itertools::Itertools;
use mockgen_model::{ImportRegistry, InterfaceDescriptor, MethodDescriptor, REFLECT_IMPORT};

/// Generated code for one interface: mock type, recorder, constructor and methods
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockBlock {
    pub interface: String,
    pub mock_name: String,

    /// Go source, starting with the blank line that separates it from what precedes
    pub text: String,
}

struct MockContext<'a> {
    mock: &'a str,
    recorder: String,
    gomock: &'a str,
    reflect: &'a str,
    types: TypeRenderer<'a>,
}

/// Emit the mock for one interface
pub fn synthesize_mock(
    descriptor: &InterfaceDescriptor,
    mock_name: &str,
    registry: &ImportRegistry,
) -> MockBlock {
    let cx = MockContext {
        mock: mock_name,
        recorder: format!("{mock_name}MockRecorder"),
        gomock: registry.runtime_alias(),
        reflect: registry.alias(REFLECT_IMPORT).unwrap_or(REFLECT_IMPORT),
        types: TypeRenderer::new(registry, &descriptor.package_path),
    };
    let mock = cx.mock;
    let recorder = cx.recorder.as_str();
    let gomock = cx.gomock;

    let mut w = GoWriter::new();
    w.blank();
    w.line(format!("// {mock} is a mock of {} interface.", descriptor.name));
    w.block(format!("type {mock} struct {{"), |w| {
        w.line(format!("ctrl     *{gomock}.Controller"));
        w.line(format!("recorder *{recorder}"));
    });
    w.blank();
    w.line(format!("// {recorder} is the mock recorder for {mock}."));
    w.block(format!("type {recorder} struct {{"), |w| {
        w.line(format!("mock *{mock}"));
    });
    w.blank();
    w.line(format!("// New{mock} creates a new mock instance."));
    w.block(
        format!("func New{mock}(ctrl *{gomock}.Controller) *{mock} {{"),
        |w| {
            w.line(format!("mock := &{mock}{{ctrl: ctrl}}"));
            w.line(format!("mock.recorder = &{recorder}{{mock}}"));
            w.line("return mock");
        },
    );
    w.blank();
    w.line("// EXPECT returns an object that allows the caller to indicate expected use.");
    w.block(format!("func (m *{mock}) EXPECT() *{recorder} {{"), |w| {
        w.line("return m.recorder");
    });

    for method in &descriptor.methods {
        w.blank();
        mock_method(&mut w, &cx, method);
        w.blank();
        recorder_method(&mut w, &cx, method);
    }

    log::debug!(
        "synthesized {mock} for {} ({} methods)",
        descriptor.name,
        descriptor.methods.len()
    );
    MockBlock {
        interface: descriptor.name.clone(),
        mock_name: mock_name.to_string(),
        text: w.finish(),
    }
}

fn arg_names(method: &MethodDescriptor) -> Vec<String> {
    (0..method.params().len()).map(|i| format!("arg{i}")).collect()
}

/// `, a, b` for the fixed arguments or `, varargs...` for a variadic call
fn call_args(args: &[String], variadic: bool) -> String {
    match (args, variadic) {
        ([], _) => String::new(),
        ([only], true) => format!(", {only}..."),
        (_, true) => ", varargs...".to_string(),
        (_, false) => format!(", {}", args.join(", ")),
    }
}

fn mock_method(w: &mut GoWriter, cx: &MockContext<'_>, method: &MethodDescriptor) {
    let name = &method.name;
    let args = arg_names(method);
    let types = cx.types.param_types(&method.signature);
    let results = method.results();

    w.line(format!("// {name} mocks base method."));
    w.block(
        format!(
            "func (m *{}) {name}({}){} {{",
            cx.mock,
            param_list(&args, &types),
            cx.types.results(results)
        ),
        |w| {
            w.line("m.ctrl.T.Helper()");
            let forwarded = match args.split_last() {
                Some((last, fixed)) if method.is_variadic() => {
                    w.line(format!("varargs := []interface{{}}{{{}}}", fixed.join(", ")));
                    w.block(format!("for _, a := range {last} {{"), |w| {
                        w.line("varargs = append(varargs, a)");
                    });
                    ", varargs...".to_string()
                }
                _ => call_args(&args, false),
            };

            if results.is_empty() {
                w.line(format!("m.ctrl.Call(m, {name:?}{forwarded})"));
                return;
            }
            w.line(format!("ret := m.ctrl.Call(m, {name:?}{forwarded})"));
            for (i, ty) in results.iter().enumerate() {
                w.line(format!("ret{i}, _ := ret[{i}].({})", cx.types.render(ty)));
            }
            w.line(format!(
                "return {}",
                (0..results.len()).map(|i| format!("ret{i}")).join(", ")
            ));
        },
    );
}

fn recorder_method(w: &mut GoWriter, cx: &MockContext<'_>, method: &MethodDescriptor) {
    let name = &method.name;
    let args = arg_names(method);
    let variadic = method.is_variadic();
    let types: Vec<String> = method
        .params()
        .iter()
        .map(|p| {
            if p.variadic {
                "...interface{}".to_string()
            } else {
                "interface{}".to_string()
            }
        })
        .collect();

    w.line(format!("// {name} indicates an expected call of {name}."));
    w.block(
        format!(
            "func (mr *{}) {name}({}) *{}.Call {{",
            cx.recorder,
            param_list(&args, &types),
            cx.gomock
        ),
        |w| {
            w.line("mr.mock.ctrl.T.Helper()");
            if let Some((last, fixed)) = args.split_last().filter(|_| variadic && args.len() > 1) {
                w.line(format!(
                    "varargs := append([]interface{{}}{{{}}}, {last}...)",
                    fixed.join(", ")
                ));
            }
            w.line(format!(
                "return mr.mock.ctrl.RecordCallWithMethodType(mr.mock, {name:?}, {}.TypeOf((*{})(nil).{name}){})",
                cx.reflect,
                cx.mock,
                call_args(&args, variadic)
            ));
        },
    );
}
