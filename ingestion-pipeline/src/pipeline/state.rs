use state_machines::state_machine;

state_machine! {
    name: DocumentMachine,
    state: DocumentState,
    initial: Discovered,
    states: [Discovered, TextExtracted, Embedded, Inserted, Updated, Skipped],
    events {
        extract { transition: { from: Discovered, to: TextExtracted } }
        embed { transition: { from: TextExtracted, to: Embedded } }
        insert { transition: { from: Embedded, to: Inserted } }
        replace { transition: { from: Embedded, to: Updated } }
        skip {
            transition: { from: Discovered, to: Skipped }
            transition: { from: TextExtracted, to: Skipped }
            transition: { from: Embedded, to: Skipped }
        }
    }
}

pub fn discovered() -> DocumentMachine<(), Discovered> {
    DocumentMachine::new(())
}
