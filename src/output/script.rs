//! Removal scripts for planned deletions.
//!
//! A [`DeletionPlan`] is exported as a script the user reviews and runs
//! from the directory the listings were made in. The script only prints
//! what it would remove unless it is started with `--confirm`.
//!
//! Every removal goes through one helper defined at the top of the script,
//! followed by the quoted candidate path and a comment naming the copy that
//! is kept:
//!
//! ```text
//! rmdup d 'backup/2019'    # 2048 bytes, kept: 'photos/2019'
//! ```

use std::io::{self, Write};

use bytesize::ByteSize;

use crate::duplicates::{DeletionCandidate, DeletionPlan};

/// Shell dialect of the generated script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptType {
    /// `/bin/sh` and compatible shells
    Posix,
    /// Windows PowerShell
    PowerShell,
}

impl ScriptType {
    /// PowerShell on Windows, POSIX elsewhere.
    #[must_use]
    pub fn detect() -> Self {
        if cfg!(windows) {
            Self::PowerShell
        } else {
            Self::Posix
        }
    }

    fn quote(self, path: &str) -> String {
        match self {
            Self::Posix => format!("'{}'", path.replace('\'', "'\\''")),
            Self::PowerShell => format!("'{}'", path.replace('\'', "''")),
        }
    }
}

/// Script writer for a deletion plan.
pub struct ScriptOutput<'a> {
    plan: &'a DeletionPlan,
    script_type: ScriptType,
}

impl<'a> ScriptOutput<'a> {
    #[must_use]
    pub fn new(plan: &'a DeletionPlan, script_type: ScriptType) -> Self {
        Self { plan, script_type }
    }

    /// Write the script.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        if self.script_type == ScriptType::Posix {
            writeln!(writer, "#!/bin/sh")?;
        }
        self.write_header(writer)?;
        match self.script_type {
            ScriptType::Posix => write_posix_prelude(writer)?,
            ScriptType::PowerShell => write_powershell_prelude(writer)?,
        }
        writeln!(writer)?;

        for candidate in &self.plan.candidates {
            self.write_removal(writer, candidate)?;
        }

        writeln!(writer)?;
        match self.script_type {
            ScriptType::Posix => writeln!(writer, "echo \"$REMOVED of {} removed\"", self.plan.len()),
            ScriptType::PowerShell => {
                writeln!(writer, "Write-Host \"$Removed of {} removed\"", self.plan.len())
            }
        }
    }

    fn write_header<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(
            writer,
            "# finddup removal script, {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(
            writer,
            "# {} candidates, {} reclaimable",
            self.plan.len(),
            ByteSize::b(self.plan.total_bytes())
        )?;
        writeln!(writer, "# Review before running. Nothing is removed without --confirm.")?;
        writeln!(writer)
    }

    fn write_removal<W: Write>(&self, writer: &mut W, candidate: &DeletionCandidate) -> io::Result<()> {
        let kind = if candidate.is_directory { 'd' } else { 'f' };
        let path = self.script_type.quote(&candidate.path);
        let kept = self.script_type.quote(&candidate.kept);
        let slave = if candidate.is_slave { ", subset" } else { "" };
        match self.script_type {
            ScriptType::Posix => writeln!(
                writer,
                "rmdup {kind} {path}    # {} bytes{slave}, kept: {kept}",
                candidate.size
            ),
            ScriptType::PowerShell => writeln!(
                writer,
                "Remove-Dup {kind} {path}    # {} bytes{slave}, kept: {kept}",
                candidate.size
            ),
        }
    }
}

fn write_posix_prelude<W: Write>(writer: &mut W) -> io::Result<()> {
    writeln!(writer, "CONFIRM=0")?;
    writeln!(writer, "[ \"$1\" = \"--confirm\" ] && CONFIRM=1")?;
    writeln!(writer, "REMOVED=0")?;
    writeln!(writer)?;
    writeln!(writer, "rmdup() {{")?;
    writeln!(writer, "    if [ \"$CONFIRM\" -ne 1 ]; then")?;
    writeln!(writer, "        printf 'would remove %s\\n' \"$2\"")?;
    writeln!(writer, "        return")?;
    writeln!(writer, "    fi")?;
    writeln!(writer, "    if [ \"$1\" = d ]; then")?;
    writeln!(writer, "        rm -rf -- \"$2\" && REMOVED=$((REMOVED + 1))")?;
    writeln!(writer, "    else")?;
    writeln!(writer, "        rm -f -- \"$2\" && REMOVED=$((REMOVED + 1))")?;
    writeln!(writer, "    fi")?;
    writeln!(writer, "}}")
}

fn write_powershell_prelude<W: Write>(writer: &mut W) -> io::Result<()> {
    writeln!(writer, "$Confirm = $args -contains '--confirm'")?;
    writeln!(writer, "$Removed = 0")?;
    writeln!(writer)?;
    writeln!(writer, "function Remove-Dup($Kind, $Path) {{")?;
    writeln!(writer, "    if (-not $Confirm) {{")?;
    writeln!(writer, "        Write-Host \"would remove $Path\"")?;
    writeln!(writer, "        return")?;
    writeln!(writer, "    }}")?;
    writeln!(writer, "    Remove-Item -LiteralPath $Path -Recurse:($Kind -eq 'd') -Force")?;
    writeln!(writer, "    if ($?) {{ $script:Removed++ }}")?;
    writeln!(writer, "}}")
}
