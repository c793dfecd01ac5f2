#![no_main]

use std::collections::VecDeque;

use libfuzzer_sys::fuzz_target;
use retirekit::ds::RetentionQueue;

// Fuzz arbitrary operation sequences on RetentionQueue
//
// Mirrors every operation on a VecDeque bounded to the same capacity.
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let capacity = 1usize << (data[0] % 6);
    let mut queue: RetentionQueue<u8> = RetentionQueue::new(capacity);
    let mut model: VecDeque<u8> = VecDeque::new();

    let mut idx = 1;
    while idx + 1 < data.len() {
        let op = data[idx] % 6;
        let value = data[idx + 1];

        match op {
            0 => {
                // put
                let result = queue.put(value);
                if model.len() == capacity {
                    assert_eq!(result, Err(value));
                } else {
                    assert_eq!(result, Ok(()));
                    model.push_back(value);
                }
            },
            1 => {
                // take
                assert_eq!(queue.take(), model.pop_front());
            },
            2 => {
                // peek
                assert_eq!(queue.peek(), model.front());
            },
            3 => {
                // remove (first match)
                let expected = model.iter().position(|v| *v == value);
                if let Some(pos) = expected {
                    model.remove(pos);
                }
                assert_eq!(queue.remove(&value), expected.is_some());
            },
            4 => {
                // iter order
                assert!(queue.iter().eq(model.iter()));
                assert_eq!(queue.contains(&value), model.contains(&value));
            },
            5 => {
                // clear
                queue.clear();
                model.clear();
            },
            _ => unreachable!(),
        }

        assert_eq!(queue.len(), model.len());
        assert_eq!(queue.is_full(), model.len() == capacity);
        #[cfg(debug_assertions)]
        queue.debug_validate_invariants();

        idx += 2;
    }
});
