//! Contact resolution.
//!
//! Turns a `--contact` argument, or an interactive search-and-pick session,
//! into exactly one contact. "Nothing selected" is `Ok(None)`, not an error.

use crate::domain::{Contact, ContactQuery, Result};

use super::fuzzy::rank_contacts;
use super::ports::{MessageSource, Prompter, Tone};

/// Resolves the contact to work on.
///
/// With an identifier, the full contact list is scanned for an exact match on
/// the number or uuid. Without one, the user picks interactively.
///
/// # Errors
/// Returns `InvalidInput` for an identifier of unknown shape, or any error from
/// listing contacts or prompting.
pub fn resolve_contact<S, P>(
    source: &S,
    prompter: &mut P,
    contact_arg: Option<&str>,
) -> Result<Option<Contact>>
where
    S: MessageSource + ?Sized,
    P: Prompter + ?Sized,
{
    match contact_arg.filter(|arg| !arg.is_empty()) {
        Some(arg) => {
            let query = ContactQuery::parse(arg)?;
            tracing::info!("Using provided contact: {arg}");
            let contacts = source.list_contacts()?;
            Ok(find_contact(&contacts, &query))
        }
        None => {
            let contacts = source.list_contacts()?;
            select_interactively(prompter, &contacts)
        }
    }
}

/// First contact whose number or uuid equals the query exactly.
#[must_use]
pub fn find_contact(contacts: &[Contact], query: &ContactQuery) -> Option<Contact> {
    contacts.iter().find(|c| query.matches(c)).cloned()
}

/// Search, pick by number, confirm. Declining starts over from the full list.
///
/// # Errors
/// Returns `Interrupted` if input closes mid-selection.
pub fn select_interactively<P>(prompter: &mut P, contacts: &[Contact]) -> Result<Option<Contact>>
where
    P: Prompter + ?Sized,
{
    if contacts.is_empty() {
        prompter.say(Tone::Failure, "No contacts found");
        return Ok(None);
    }

    loop {
        prompter.say(Tone::Plain, &format!("Found {} contacts", contacts.len()));
        prompter.show_contacts("Signal Contacts", contacts);

        let query = prompter.ask(
            "Search contacts (name or number, or leave blank to see all)",
            Some(""),
        )?;
        let query = query.trim();

        let filtered: Vec<Contact> = if query.is_empty() {
            contacts.to_vec()
        } else {
            let ranked = rank_contacts(query, contacts);
            tracing::debug!(query, matches = ranked.len(), "Fuzzy search");
            if ranked.is_empty() {
                prompter.say(Tone::Warning, &format!("No contacts match '{query}'"));
                return Ok(None);
            }
            let filtered: Vec<Contact> = ranked.into_iter().map(|(c, _)| c).collect();
            prompter.say(Tone::Plain, &format!("Filtered: {} contacts", filtered.len()));
            prompter.show_contacts("Signal Contacts", &filtered);
            filtered
        };

        let chosen = pick_by_index(prompter, &filtered)?;
        show_preview(prompter, &chosen);

        if prompter.confirm("Proceed with this contact?")? {
            return Ok(Some(chosen));
        }
        tracing::debug!("Contact declined, restarting selection");
    }
}

/// Re-asks until a valid 1-based index is entered.
fn pick_by_index<P>(prompter: &mut P, contacts: &[Contact]) -> Result<Contact>
where
    P: Prompter + ?Sized,
{
    loop {
        let answer = prompter.ask(
            &format!("Enter contact number (1-{})", contacts.len()),
            None,
        )?;

        match answer.trim().parse::<usize>() {
            Ok(n) if (1..=contacts.len()).contains(&n) => return Ok(contacts[n - 1].clone()),
            Ok(_) => prompter.say(Tone::Failure, "Invalid selection"),
            Err(_) => prompter.say(Tone::Failure, "Please enter a number"),
        }
    }
}

fn show_preview<P>(prompter: &mut P, contact: &Contact)
where
    P: Prompter + ?Sized,
{
    let dash = || "—".to_string();
    prompter.show_panel(
        "Contact Preview",
        &[
            ("Name", contact.name.clone().unwrap_or_else(dash)),
            ("Number", contact.number.clone().unwrap_or_else(dash)),
            ("UUID", contact.uuid.clone().unwrap_or_else(dash)),
        ],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{FakeAccount, ScriptedPrompter};
    use crate::domain::AppError;

    fn contacts() -> Vec<Contact> {
        vec![
            Contact {
                name: Some("Alice Smith".into()),
                number: Some("+15551234567".into()),
                uuid: Some("550e8400-e29b-41d4-a716-446655440000".into()),
            },
            Contact {
                name: Some("Bob Jones".into()),
                number: None,
                uuid: Some("f6a7b810-9dad-11d1-80b4-00c04fd430c8".into()),
            },
            Contact {
                name: Some("Alice Clone".into()),
                number: Some("+15551234567".into()),
                uuid: None,
            },
        ]
    }

    #[test]
    fn test_direct_number_first_match_wins() {
        let account = FakeAccount::new(contacts(), vec![]);
        let mut prompter = ScriptedPrompter::new(&[]);

        let found = resolve_contact(&account, &mut prompter, Some("+15551234567")).unwrap();
        assert_eq!(found.unwrap().name.as_deref(), Some("Alice Smith"));
        assert!(prompter.asked.is_empty());
    }

    #[test]
    fn test_direct_uuid_match() {
        let account = FakeAccount::new(contacts(), vec![]);
        let mut prompter = ScriptedPrompter::new(&[]);

        let found =
            resolve_contact(&account, &mut prompter, Some("f6a7b810-9dad-11d1-80b4-00c04fd430c8"))
                .unwrap();
        assert_eq!(found.unwrap().name.as_deref(), Some("Bob Jones"));
    }

    #[test]
    fn test_direct_digit_first_uuid_finds_nothing() {
        let account = FakeAccount::new(contacts(), vec![]);
        let mut prompter = ScriptedPrompter::new(&[]);

        // Classified as a number, so it is compared against phone numbers only.
        let found =
            resolve_contact(&account, &mut prompter, Some("550e8400-e29b-41d4-a716-446655440000"))
                .unwrap();
        assert!(found.is_none());
        assert!(prompter.asked.is_empty());
    }

    #[test]
    fn test_direct_no_match_is_no_selection() {
        let account = FakeAccount::new(contacts(), vec![]);
        let mut prompter = ScriptedPrompter::new(&[]);

        let found = resolve_contact(&account, &mut prompter, Some("+19999999999")).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_direct_invalid_shape_is_error() {
        let account = FakeAccount::new(contacts(), vec![]);
        let mut prompter = ScriptedPrompter::new(&[]);

        let err = resolve_contact(&account, &mut prompter, Some("alice")).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput { .. }));
    }

    #[test]
    fn test_interactive_search_pick_confirm() {
        let mut prompter = ScriptedPrompter::new(&["bob", "1", "y"]);
        let found = select_interactively(&mut prompter, &contacts()).unwrap();
        assert_eq!(found.unwrap().name.as_deref(), Some("Bob Jones"));
    }

    #[test]
    fn test_interactive_reprompts_on_bad_index() {
        let mut prompter = ScriptedPrompter::new(&["", "abc", "0", "9", "2", "yes"]);
        let found = select_interactively(&mut prompter, &contacts()).unwrap();
        assert_eq!(found.unwrap().name.as_deref(), Some("Bob Jones"));
        assert!(prompter.output.iter().any(|l| l == "Please enter a number"));
        assert_eq!(
            prompter
                .output
                .iter()
                .filter(|l| *l == "Invalid selection")
                .count(),
            2
        );
    }

    #[test]
    fn test_interactive_decline_restarts_from_full_list() {
        let mut prompter = ScriptedPrompter::new(&["bob", "1", "n", "", "1", "y"]);
        let found = select_interactively(&mut prompter, &contacts()).unwrap();
        assert_eq!(found.unwrap().name.as_deref(), Some("Alice Smith"));
    }

    #[test]
    fn test_interactive_no_matches_is_no_selection() {
        let mut prompter = ScriptedPrompter::new(&["zzzzqqqq"]);
        let found = select_interactively(&mut prompter, &contacts()).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_interactive_empty_list() {
        let mut prompter = ScriptedPrompter::new(&[]);
        assert!(select_interactively(&mut prompter, &[]).unwrap().is_none());
    }

    #[test]
    fn test_interactive_closed_input_is_interrupted() {
        let mut prompter = ScriptedPrompter::new(&["", "1"]);
        let err = select_interactively(&mut prompter, &contacts()).unwrap_err();
        assert!(matches!(err, AppError::Interrupted));
    }
}
