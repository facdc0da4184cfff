// Command abbreviation matching for the tdl CLI

/// Top-level commands
pub const TOP_LEVEL_COMMANDS: &[&str] = &[
    "add", "edit", "mark", "unmark", "list", "search", "sort", "delete", "ui", "help",
];

/// Short aliases registered on the clap commands; always matched exactly
pub const COMMAND_ALIASES: &[&str] = &["a", "e", "m", "u", "ls", "s", "d", "rm"];

/// Find all commands that start with the given prefix (case-insensitive)
pub fn find_matching_commands<'a>(prefix: &str, commands: &'a [&str]) -> Vec<&'a str> {
    let prefix_lower = prefix.to_lowercase();
    commands
        .iter()
        .filter(|cmd| cmd.starts_with(&prefix_lower))
        .copied()
        .collect()
}

/// Find a unique command match for the given prefix
/// Returns Ok(command) if exactly one match, Err(matches) if ambiguous, Err(empty) if no match
/// Note: Exact matches take precedence over prefix matches
pub fn find_unique_command<'a>(prefix: &str, commands: &'a [&str]) -> Result<&'a str, Vec<&'a str>> {
    let prefix_lower = prefix.to_lowercase();
    if let Some(cmd) = commands.iter().find(|cmd| **cmd == prefix_lower) {
        return Ok(*cmd);
    }

    let matches = find_matching_commands(prefix, commands);
    if matches.len() == 1 {
        Ok(matches[0])
    } else {
        Err(matches)
    }
}

/// Expand an abbreviated command name in the first position
///
/// Flags, aliases and unknown words are left alone so clap can handle or
/// reject them. An ambiguous prefix is an error naming the candidates.
pub fn expand_command_abbreviations(mut args: Vec<String>) -> Result<Vec<String>, String> {
    let Some(first) = args.first().cloned() else {
        return Ok(args);
    };
    if first.starts_with('-') || COMMAND_ALIASES.contains(&first.as_str()) {
        return Ok(args);
    }

    match find_unique_command(&first, TOP_LEVEL_COMMANDS) {
        Ok(cmd) => args[0] = cmd.to_string(),
        Err(matches) if matches.len() > 1 => {
            return Err(format!(
                "Ambiguous command '{}'. Did you mean one of: {}?",
                first,
                matches.join(", ")
            ));
        }
        Err(_) => {}
    }
    Ok(args)
}
