use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MemoryFunction {
    SaveMemory,
    GetMemory,
    GetAllMemory,
    ClearMemory,
    SearchMemory,
    GetMemoryStats,
    GetCommandHistory,
}

impl MemoryFunction {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryFunction::SaveMemory => "saveMemory",
            MemoryFunction::GetMemory => "getMemory",
            MemoryFunction::GetAllMemory => "getAllMemory",
            MemoryFunction::ClearMemory => "clearMemory",
            MemoryFunction::SearchMemory => "searchMemory",
            MemoryFunction::GetMemoryStats => "getMemoryStats",
            MemoryFunction::GetCommandHistory => "getCommandHistory",
        }
    }

    /// Human-readable action name reported in results.
    pub fn action(&self) -> &'static str {
        match self {
            MemoryFunction::SaveMemory => "Remember",
            MemoryFunction::GetMemory => "Recall",
            MemoryFunction::GetAllMemory => "Show Memory",
            MemoryFunction::ClearMemory => "Clear Memory",
            MemoryFunction::SearchMemory => "Search Memory",
            MemoryFunction::GetMemoryStats => "Memory Stats",
            MemoryFunction::GetCommandHistory => "Command History",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FileFunction {
    CreateFile,
    CreateDirectory,
    DeleteFile,
    CopyFile,
    MoveFile,
    ListFiles,
}

impl FileFunction {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileFunction::CreateFile => "createFile",
            FileFunction::CreateDirectory => "createDirectory",
            FileFunction::DeleteFile => "deleteFile",
            FileFunction::CopyFile => "copyFile",
            FileFunction::MoveFile => "moveFile",
            FileFunction::ListFiles => "listFiles",
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            FileFunction::CreateFile => "Create File",
            FileFunction::CreateDirectory => "Create Directory",
            FileFunction::DeleteFile => "Delete File",
            FileFunction::CopyFile => "Copy File",
            FileFunction::MoveFile => "Move File",
            FileFunction::ListFiles => "List Files",
        }
    }
}

/// Outcome of classifying one line of user input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ParsedIntent {
    MemoryOp {
        function: MemoryFunction,
        args: Vec<String>,
    },
    FileOp {
        function: FileFunction,
        args: Vec<String>,
    },
    Shell {
        command: String,
    },
    ParseError {
        reason: String,
    },
}

impl ParsedIntent {
    pub fn kind(&self) -> IntentKind {
        match self {
            ParsedIntent::MemoryOp { .. } => IntentKind::Memory,
            ParsedIntent::FileOp { .. } => IntentKind::File,
            ParsedIntent::Shell { .. } => IntentKind::Shell,
            ParsedIntent::ParseError { .. } => IntentKind::Invalid,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    Memory,
    File,
    Shell,
    Invalid,
}
