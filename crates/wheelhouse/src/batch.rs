use tokio::task;

/// Runs `work` on every input on the blocking pool and waits for all of them.
///
/// Results come back in input order. A unit that panics resolves to
/// `fallback(&input)` instead of failing the batch, so a caller always gets
/// exactly one output per input.
pub async fn fan_out<I, O, W, F>(inputs: Vec<I>, work: W, fallback: F) -> Vec<O>
where
    I: Clone + Send + 'static,
    O: Send + 'static,
    W: Fn(I) -> O + Clone + Send + 'static,
    F: Fn(&I) -> O,
{
    let handles: Vec<_> = inputs
        .into_iter()
        .map(|input| {
            let work = work.clone();
            let handle = task::spawn_blocking({
                let input = input.clone();
                move || work(input)
            });
            (input, handle)
        })
        .collect();

    let mut outputs = Vec::with_capacity(handles.len());
    for (input, handle) in handles {
        match handle.await {
            Ok(output) => outputs.push(output),
            Err(e) => {
                log::error!("Batch unit failed, using fallback: {}", e);
                outputs.push(fallback(&input));
            }
        }
    }
    outputs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn keeps_input_order() {
        let out = fan_out(
            vec![30u64, 0, 10],
            |ms| {
                std::thread::sleep(Duration::from_millis(ms));
                ms * 2
            },
            |_| 0,
        )
        .await;
        assert_eq!(out, vec![60, 0, 20]);
    }

    #[tokio::test]
    async fn a_panicking_unit_falls_back_alone() {
        let out = fan_out(
            vec![1, 2, 3],
            |n: i32| {
                if n == 2 {
                    panic!("boom");
                }
                n
            },
            |n| -n,
        )
        .await;
        assert_eq!(out, vec![1, -2, 3]);
    }

    #[tokio::test]
    async fn empty_batch() {
        let out: Vec<i32> = fan_out(Vec::<i32>::new(), |n| n, |n| *n).await;
        assert!(out.is_empty());
    }
}
