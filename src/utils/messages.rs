// User-facing message strings, collected in one place.
// Buyer/seller/agent-facing strings are Greek, admin/debug strings English,
// matching what the frontend expects.

pub const UNAUTHORIZED: &str = "Μη εξουσιοδοτημένη πρόσβαση";
pub const FORBIDDEN: &str = "Δεν έχετε δικαίωμα πρόσβασης";
pub const TOKEN_MISSING: &str = "Μη εξουσιοδοτημένη πρόσβαση - Token λείπει";
pub const TOKEN_INVALID: &str = "Μη έγκυρο token";

pub const PROPERTY_NOT_FOUND: &str = "Το ακίνητο δεν βρέθηκε";
pub const OWN_PROPERTY_INTEREST: &str =
    "Δεν μπορείτε να εκδηλώσετε ενδιαφέρον για ακίνητο που έχετε καταχωρήσει εσείς";
pub const NO_ACTIVE_INTEREST: &str = "Δεν βρέθηκε ενεργό ενδιαφέρον για αυτό το ακίνητο";
pub const INTEREST_CANCELLED_OK: &str = "Το ενδιαφέρον ακυρώθηκε επιτυχώς";
pub const CONNECTION_EXISTS: &str = "Η σύνδεση υπάρχει ήδη";

pub const INTEREST_TITLE: &str = "Εκδήλωση Ενδιαφέροντος";
pub const INTEREST_REGISTERED: &str = "✅ Η εκδήλωση ενδιαφέροντος καταχωρήθηκε με επιτυχία!";
pub const NEW_INTEREST_TITLE: &str = "Νέο Ενδιαφέρον";
pub const CANCEL_INTEREST_TITLE: &str = "Ακύρωση Ενδιαφέροντος";
pub const TXN_CANCELLED_BY_BUYER: &str = "Η συναλλαγή ακυρώθηκε από τον αγοραστή";
pub const TXN_RESTORED_BY_BUYER: &str = "Η συναλλαγή επαναφέρθηκε από τον αγοραστή";

pub const AGENT_CONNECTION_TITLE: &str = "Νέα Σύνδεση με Αγοραστή";
pub const AGENT_LEAD_ADDED_TITLE: &str = "Επιτυχημένη Προσθήκη Ενδιαφερόμενου";
pub const BUYER_CONNECTED_TITLE: &str = "Επιτυχής Σύνδεση με Μεσίτη";
pub const BUYER_CONNECTED_BODY: &str = "✅ Η σύνδεσή σας με τον μεσίτη ολοκληρώθηκε με επιτυχία!";

pub const AGENT_STAGE_UPDATE_TITLE: &str = "Ενημέρωση Στάδιου Συναλλαγής";
pub const VIEWING_REQUEST_TITLE: &str = "Νέο Αίτημα Προβολής";
pub const VIEWING_SCHEDULED_TITLE: &str = "Νέα Προγραμματισμένη Προβολή";
pub const VIEWING_ACCEPTED_TITLE: &str = "Αίτημα Προβολής Εγκεκριμένο";
pub const VIEWING_REJECTED_TITLE: &str = "Αίτημα Προβολής Απορρίφθηκε";
pub const VIEWING_NOT_FOUND: &str = "Το αίτημα προβολής δεν βρέθηκε";
pub const SLOT_TAKEN: &str = "Selected time is not available";

pub const SUPPORT_TICKET_TITLE: &str = "Νέο Αίτημα Υποστήριξης";
pub const SUPPORT_REPLY_TITLE: &str = "Νέα Απάντηση Υποστήριξης";
pub const INQUIRY_TITLE: &str = "Νέο Ερώτημα";
pub const REMOVAL_REQUEST_TITLE: &str = "Αίτημα Αφαίρεσης Ακινήτου";

pub const UNKNOWN_BUYER: &str = "Άγνωστος ενδιαφερόμενος";
pub const UNKNOWN_PROPERTY: &str = "Άγνωστο ακίνητο";

/// Greek label for a lifecycle stage, used in agent-facing notifications
pub fn stage_in_greek(stage: &str) -> &str {
    match stage {
        "PENDING" => "Αναμονή για ραντεβού",
        "MEETING_SCHEDULED" => "Έγινε ραντεβού",
        "DEPOSIT_PAID" => "Έγινε προκαταβολή",
        "FINAL_SIGNING" => "Τελική υπογραφή",
        "COMPLETED" => "Ολοκληρώθηκε",
        "CANCELLED" => "Ακυρώθηκε",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_in_greek_known_stages() {
        assert_eq!(stage_in_greek("COMPLETED"), "Ολοκληρώθηκε");
        assert_eq!(stage_in_greek("CANCELLED"), "Ακυρώθηκε");
    }

    #[test]
    fn test_stage_in_greek_passthrough() {
        assert_eq!(stage_in_greek("SOMETHING_ELSE"), "SOMETHING_ELSE");
    }
}
