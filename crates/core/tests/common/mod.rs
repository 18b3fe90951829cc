#![allow(dead_code)]

use bugex_core::host::{ClassHost, InMemoryHost, LoadedClass};
use bugex_core::{FactExtractingLoader, Result, TestCase, TestFailure, TestOutcome, TestRunner};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::rc::Rc;

pub const TEST_CLASS: &str = "de.mypackage.TestMyClass";
pub const FAILING_TEST: &str = "de.mypackage.TestMyClass#testGetMin";
pub const TARGET_CLASS: &str = "de.mypackage.MyClass";

const ACC_PUBLIC: u16 = 0x0001;
const ACC_STATIC: u16 = 0x0008;
const ACC_SUPER: u16 = 0x0020;
const NOP: u8 = 0x00;
const RETURN: u8 = 0xB1;

struct MethodDef {
    name: String,
    /// (start_pc, line) in table order
    table: Vec<(u16, u16)>,
}

/// Assembles a minimal, well-formed class image (version 52.0) whose
/// methods are `nop` sequences ending in `return`.
pub struct ClassImageBuilder {
    internal_name: String,
    methods: Vec<MethodDef>,
    corrupt_method_names: bool,
}

impl ClassImageBuilder {
    /// `class_name` in dotted form.
    pub fn new(class_name: &str) -> Self {
        Self {
            internal_name: class_name.replace('.', "/"),
            methods: Vec::new(),
            corrupt_method_names: false,
        }
    }

    /// One marker per line, at consecutive code offsets.
    pub fn method(self, name: &str, lines: &[u16]) -> Self {
        let table = lines
            .iter()
            .enumerate()
            .map(|(pc, line)| (pc as u16, *line))
            .collect();
        self.method_with_table(name, table)
    }

    pub fn method_with_table(mut self, name: &str, table: Vec<(u16, u16)>) -> Self {
        self.methods.push(MethodDef {
            name: name.to_string(),
            table,
        });
        self
    }

    /// Points every method name at a class constant instead of a UTF-8 entry.
    pub fn corrupt_method_names(mut self) -> Self {
        self.corrupt_method_names = true;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut pool = Pool::default();
        let this_class = pool.class(&self.internal_name);
        let super_class = pool.class("java/lang/Object");
        let code_name = pool.utf8("Code");
        let line_table_name = pool.utf8("LineNumberTable");
        let descriptor = pool.utf8("()V");

        let mut methods = Vec::new();
        for method in &self.methods {
            let name_index = if self.corrupt_method_names {
                this_class
            } else {
                pool.utf8(&method.name)
            };
            let flags = if method.name == "<clinit>" {
                ACC_STATIC
            } else {
                ACC_PUBLIC
            };
            methods.push(encode_method(
                method,
                flags,
                name_index,
                descriptor,
                code_name,
                line_table_name,
            ));
        }

        let mut out = Vec::new();
        out.extend(0xCAFEBABEu32.to_be_bytes());
        out.extend(0u16.to_be_bytes());
        out.extend(52u16.to_be_bytes());
        out.extend((pool.entries.len() as u16 + 1).to_be_bytes());
        for entry in &pool.entries {
            out.extend(entry);
        }
        out.extend((ACC_PUBLIC | ACC_SUPER).to_be_bytes());
        out.extend(this_class.to_be_bytes());
        out.extend(super_class.to_be_bytes());
        out.extend(0u16.to_be_bytes()); // interfaces
        out.extend(0u16.to_be_bytes()); // fields
        out.extend((methods.len() as u16).to_be_bytes());
        for method in methods {
            out.extend(method);
        }
        out.extend(0u16.to_be_bytes()); // class attributes
        out
    }
}

fn encode_method(
    method: &MethodDef,
    flags: u16,
    name_index: u16,
    descriptor: u16,
    code_name: u16,
    line_table_name: u16,
) -> Vec<u8> {
    let code_len = method
        .table
        .iter()
        .map(|(pc, _)| *pc as usize + 1)
        .max()
        .unwrap_or(0);
    let mut code = vec![NOP; code_len];
    code.push(RETURN);

    let mut line_table = Vec::new();
    if !method.table.is_empty() {
        line_table.extend(line_table_name.to_be_bytes());
        line_table.extend((2 + 4 * method.table.len() as u32).to_be_bytes());
        line_table.extend((method.table.len() as u16).to_be_bytes());
        for (pc, line) in &method.table {
            line_table.extend(pc.to_be_bytes());
            line_table.extend(line.to_be_bytes());
        }
    }

    let mut body = Vec::new();
    body.extend(0u16.to_be_bytes()); // max_stack
    body.extend(1u16.to_be_bytes()); // max_locals
    body.extend((code.len() as u32).to_be_bytes());
    body.extend(&code);
    body.extend(0u16.to_be_bytes()); // exception table
    let nested = if line_table.is_empty() { 0u16 } else { 1u16 };
    body.extend(nested.to_be_bytes());
    body.extend(&line_table);

    let mut out = Vec::new();
    out.extend(flags.to_be_bytes());
    out.extend(name_index.to_be_bytes());
    out.extend(descriptor.to_be_bytes());
    out.extend(1u16.to_be_bytes());
    out.extend(code_name.to_be_bytes());
    out.extend((body.len() as u32).to_be_bytes());
    out.extend(body);
    out
}

#[derive(Default)]
struct Pool {
    entries: Vec<Vec<u8>>,
    utf8: HashMap<String, u16>,
}

impl Pool {
    fn push(&mut self, entry: Vec<u8>) -> u16 {
        self.entries.push(entry);
        self.entries.len() as u16
    }

    fn utf8(&mut self, value: &str) -> u16 {
        if let Some(index) = self.utf8.get(value) {
            return *index;
        }
        let mut entry = vec![1u8];
        entry.extend((value.len() as u16).to_be_bytes());
        entry.extend(value.as_bytes());
        let index = self.push(entry);
        self.utf8.insert(value.to_string(), index);
        index
    }

    fn class(&mut self, internal_name: &str) -> u16 {
        let name_index = self.utf8(internal_name);
        let mut entry = vec![7u8];
        entry.extend(name_index.to_be_bytes());
        self.push(entry)
    }
}

/// Class under test: `getMin` spans lines 10..=20, `tiny` sits on line 5.
pub fn target_class() -> Vec<u8> {
    ClassImageBuilder::new(TARGET_CLASS)
        .method("<init>", &[3])
        .method("getMin", &[10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20])
        .method("tiny", &[5])
        .build()
}

pub fn test_class() -> Vec<u8> {
    ClassImageBuilder::new(TEST_CLASS)
        .method("<init>", &[6])
        .method("testGetMin", &[9, 10, 11])
        .build()
}

pub fn write_class_file(root: &Path, class_name: &str, bytes: &[u8]) {
    let path = root.join(class_name.replace('.', "/") + ".class");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, bytes).unwrap();
}

pub fn write_jar(path: &Path, classes: &[(&str, Vec<u8>)]) {
    let file = File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    for (class_name, bytes) in classes {
        zip.start_file(class_name.replace('.', "/") + ".class", options)
            .unwrap();
        zip.write_all(bytes).unwrap();
    }
    zip.finish().unwrap();
}

/// In-memory host that shares its define log with the test.
pub struct RecordingHost {
    inner: InMemoryHost,
    log: Rc<RefCell<Vec<String>>>,
}

impl RecordingHost {
    pub fn new(inner: InMemoryHost) -> (Self, Rc<RefCell<Vec<String>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                inner,
                log: log.clone(),
            },
            log,
        )
    }
}

impl ClassHost for RecordingHost {
    fn delegate(&mut self, class_name: &str) -> Result<LoadedClass> {
        self.inner.delegate(class_name)
    }

    fn define(&mut self, class_name: &str, image: Vec<u8>) -> Result<LoadedClass> {
        self.log.borrow_mut().push(class_name.to_string());
        self.inner.define(class_name, image)
    }
}

/// Loads a fixed list of classes, then reports a scripted outcome.
pub struct ScriptedRunner {
    pub touches: Vec<String>,
    pub outcome: TestOutcome,
}

impl ScriptedRunner {
    /// `testGetMin` fails.
    pub fn failing(touches: &[&str]) -> Self {
        Self::failing_with(touches, &["testGetMin(de.mypackage.TestMyClass)"])
    }

    /// Reports one failure per JUnit description.
    pub fn failing_with(touches: &[&str], descriptions: &[&str]) -> Self {
        let failures = descriptions
            .iter()
            .map(|description| TestFailure {
                description: description.to_string(),
                message: "java.lang.AssertionError: expected:<1> but was:<2>".to_string(),
            })
            .collect::<Vec<_>>();
        Self {
            touches: touches.iter().map(|s| s.to_string()).collect(),
            outcome: TestOutcome::failed(failures.len() + 1, failures),
        }
    }

    pub fn passing(touches: &[&str]) -> Self {
        Self {
            touches: touches.iter().map(|s| s.to_string()).collect(),
            outcome: TestOutcome::passed(1),
        }
    }
}

impl TestRunner for ScriptedRunner {
    fn run(&mut self, _test: &TestCase, loader: &mut FactExtractingLoader) -> Result<TestOutcome> {
        for class_name in &self.touches {
            loader.load_class(class_name)?;
        }
        Ok(self.outcome.clone())
    }
}
