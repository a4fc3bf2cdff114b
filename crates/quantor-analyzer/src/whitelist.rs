/// Import roots a strategy is allowed to reach for. Mirrors the Python
/// reference implementation's module allowlist, minus `talib`/`hqg_algorithms`
/// which have no meaning once the engine runs inside Rust — strategies import
/// `hqg_algorithms` purely for the `Strategy`/`Cadence`/`BarSize` symbols the
/// metadata extractor resolves statically, so the root stays allowed.
pub const ALLOWED_MODULES: &[&str] = &[
    "numpy",
    "pandas",
    "math",
    "statistics",
    "talib",
    "hqg_algorithms",
    "datetime",
    "typing",
    "collections",
    "itertools",
    "functools",
    "dataclasses",
    "enum",
    "decimal",
    "fractions",
    "abc",
];

/// Builtin function calls a strategy may make.
pub const ALLOWED_BUILTINS: &[&str] = &[
    "int", "float", "str", "bool", "list", "dict", "set", "tuple", "frozenset", "bytes",
    "bytearray", "complex", "range", "enumerate", "zip", "map", "filter", "reversed", "sorted",
    "len", "sum", "min", "max", "abs", "round", "pow", "all", "any", "isinstance", "issubclass",
    "type", "callable", "hasattr", "getattr", "setattr", "delattr", "id", "hash", "repr", "format",
    "iter", "next", "print", "slice", "object", "super", "property", "staticmethod",
    "classmethod", "divmod", "ord", "chr", "bin", "hex", "oct",
];

/// Calls that are never allowed regardless of whether they shadow a real
/// Python builtin name — these are rejected before the allowlist is even
/// consulted, so a strategy can't bypass them by name-mangling.
pub const FORBIDDEN_BUILTINS: &[&str] = &[
    "eval",
    "exec",
    "compile",
    "__import__",
    "open",
    "input",
    "breakpoint",
    "help",
    "globals",
    "locals",
    "vars",
    "dir",
    "memoryview",
];

/// The remainder of Python's builtin namespace — exception types and the
/// handful of other names `dir(builtins)` would surface that aren't already
/// allowed or forbidden outright. A call to any of these is rejected the
/// same way an unlisted allowed-builtin call is.
pub const OTHER_KNOWN_BUILTINS: &[&str] = &[
    "ArithmeticError",
    "AssertionError",
    "AttributeError",
    "BaseException",
    "BlockingIOError",
    "BrokenPipeError",
    "BufferError",
    "BytesWarning",
    "ChildProcessError",
    "ConnectionAbortedError",
    "ConnectionError",
    "ConnectionRefusedError",
    "ConnectionResetError",
    "DeprecationWarning",
    "EOFError",
    "Exception",
    "FileExistsError",
    "FileNotFoundError",
    "FloatingPointError",
    "FutureWarning",
    "GeneratorExit",
    "ImportError",
    "ImportWarning",
    "IndentationError",
    "IndexError",
    "InterruptedError",
    "IsADirectoryError",
    "KeyError",
    "KeyboardInterrupt",
    "LookupError",
    "MemoryError",
    "ModuleNotFoundError",
    "NameError",
    "NotADirectoryError",
    "NotImplementedError",
    "OSError",
    "OverflowError",
    "PendingDeprecationWarning",
    "PermissionError",
    "ProcessLookupError",
    "RecursionError",
    "ReferenceError",
    "ResourceWarning",
    "RuntimeError",
    "RuntimeWarning",
    "StopAsyncIteration",
    "StopIteration",
    "SyntaxError",
    "SyntaxWarning",
    "SystemError",
    "SystemExit",
    "TabError",
    "TimeoutError",
    "TypeError",
    "UnboundLocalError",
    "UnicodeDecodeError",
    "UnicodeEncodeError",
    "UnicodeError",
    "UnicodeTranslateError",
    "UnicodeWarning",
    "UserWarning",
    "ValueError",
    "Warning",
    "ZeroDivisionError",
    "ascii",
    "anext",
    "aiter",
    "copyright",
    "credits",
    "exit",
    "license",
    "quit",
];

/// Attribute names that would let strategy code climb out of its object
/// graph into interpreter internals.
pub const FORBIDDEN_ATTRIBUTES: &[&str] = &[
    "__globals__",
    "__locals__",
    "__code__",
    "__builtins__",
    "__dict__",
    "__class__",
    "__bases__",
    "__mro__",
    "__subclasses__",
    "__init_subclass__",
    "__set_name__",
    "__frame__",
    "__traceback__",
    "f_globals",
    "f_locals",
    "f_code",
    "gi_frame",
    "gi_code",
    "cr_frame",
    "cr_code",
    "__loader__",
    "__spec__",
    "__path__",
    "__file__",
    "__cached__",
    "__reduce__",
    "__reduce_ex__",
    "__getstate__",
    "__setstate__",
];
