//! Standard-library interfaces that can be embedded without their source.
//!
//! Types are spelled with predeclared names only; `[]T` is the one composite form.

pub(crate) struct KnownMethod {
    pub name: &'static str,
    pub params: &'static [&'static str],
    pub results: &'static [&'static str],
}

pub(crate) struct KnownInterface {
    pub path: &'static str,
    pub name: &'static str,
    pub methods: &'static [KnownMethod],
}

const fn method(
    name: &'static str,
    params: &'static [&'static str],
    results: &'static [&'static str],
) -> KnownMethod {
    KnownMethod {
        name,
        params,
        results,
    }
}

const READ: KnownMethod = method("Read", &["[]byte"], &["int", "error"]);
const WRITE: KnownMethod = method("Write", &["[]byte"], &["int", "error"]);
const CLOSE: KnownMethod = method("Close", &[], &["error"]);
const SEEK: KnownMethod = method("Seek", &["int64", "int"], &["int64", "error"]);
const READ_AT: KnownMethod = method("ReadAt", &["[]byte", "int64"], &["int", "error"]);
const WRITE_AT: KnownMethod = method("WriteAt", &["[]byte", "int64"], &["int", "error"]);
const READ_BYTE: KnownMethod = method("ReadByte", &[], &["byte", "error"]);
const UNREAD_BYTE: KnownMethod = method("UnreadByte", &[], &["error"]);
const WRITE_BYTE: KnownMethod = method("WriteByte", &["byte"], &["error"]);
const READ_RUNE: KnownMethod = method("ReadRune", &[], &["rune", "int", "error"]);
const UNREAD_RUNE: KnownMethod = method("UnreadRune", &[], &["error"]);
const WRITE_STRING: KnownMethod = method("WriteString", &["string"], &["int", "error"]);
const STRING: KnownMethod = method("String", &[], &["string"]);
const GO_STRING: KnownMethod = method("GoString", &[], &["string"]);
const LEN: KnownMethod = method("Len", &[], &["int"]);
const LESS: KnownMethod = method("Less", &["int", "int"], &["bool"]);
const SWAP: KnownMethod = method("Swap", &["int", "int"], &[]);
const ERROR_METHOD: KnownMethod = method("Error", &[], &["string"]);

/// Method set of the predeclared `error` interface
pub(crate) const ERROR: KnownInterface = KnownInterface {
    path: "",
    name: "error",
    methods: &[ERROR_METHOD],
};

const KNOWN: &[KnownInterface] = &[
    known("io", "Reader", &[READ]),
    known("io", "Writer", &[WRITE]),
    known("io", "Closer", &[CLOSE]),
    known("io", "Seeker", &[SEEK]),
    known("io", "ReaderAt", &[READ_AT]),
    known("io", "WriterAt", &[WRITE_AT]),
    known("io", "ByteReader", &[READ_BYTE]),
    known("io", "ByteScanner", &[READ_BYTE, UNREAD_BYTE]),
    known("io", "ByteWriter", &[WRITE_BYTE]),
    known("io", "RuneReader", &[READ_RUNE]),
    known("io", "RuneScanner", &[READ_RUNE, UNREAD_RUNE]),
    known("io", "StringWriter", &[WRITE_STRING]),
    known("io", "ReadWriter", &[READ, WRITE]),
    known("io", "ReadCloser", &[READ, CLOSE]),
    known("io", "WriteCloser", &[WRITE, CLOSE]),
    known("io", "ReadWriteCloser", &[READ, WRITE, CLOSE]),
    known("io", "ReadSeeker", &[READ, SEEK]),
    known("io", "ReadSeekCloser", &[READ, SEEK, CLOSE]),
    known("io", "WriteSeeker", &[WRITE, SEEK]),
    known("io", "ReadWriteSeeker", &[READ, WRITE, SEEK]),
    known("fmt", "Stringer", &[STRING]),
    known("fmt", "GoStringer", &[GO_STRING]),
    known("sort", "Interface", &[LEN, LESS, SWAP]),
];

const fn known(
    path: &'static str,
    name: &'static str,
    methods: &'static [KnownMethod],
) -> KnownInterface {
    KnownInterface {
        path,
        name,
        methods,
    }
}

pub(crate) fn lookup(path: &str, name: &str) -> Option<&'static KnownInterface> {
    KNOWN.iter().find(|k| k.path == path && k.name == name)
}
