//! CUDA kernel sources, compiled at runtime via NVRTC.
//!
//! Both kernels walk the backward CSR resident on the device. Every sample
//! owns an O(n) slab (visited flags + worklist, plus threshold/accumulator
//! slabs for LT), so host code sizes batches to fit device memory.
//!
//! Per-sample randomness is a xorshift64* stream seeded from the (root,
//! seed) pair the host transfers — the device never shares RNG state with
//! the CPU workers.

/// Independent Cascade: one thread per sample, breadth-first expansion,
/// one draw per edge per expansion attempt.
pub const IC_KERNEL: &str = r#"
extern "C" __global__ void ic_rr_sets(
    const unsigned int* __restrict__ offsets,
    const unsigned int* __restrict__ targets,
    const float*        __restrict__ weights,
    unsigned int n,
    unsigned int batch,
    const unsigned int*       __restrict__ roots,
    const unsigned long long* __restrict__ seeds,
    unsigned char* __restrict__ visited,   // [batch * n], zeroed by host
    unsigned int*  __restrict__ worklist)  // [batch * n]
{
    unsigned int s = blockIdx.x * blockDim.x + threadIdx.x;
    if (s >= batch) return;

    unsigned char* vis = visited  + (size_t)s * n;
    unsigned int*  q   = worklist + (size_t)s * n;
    unsigned long long state = seeds[s] | 1ULL;

    unsigned int head = 0, tail = 0;
    unsigned int root = roots[s];
    vis[root] = 1;
    q[tail++] = root;

    while (head < tail) {
        unsigned int u = q[head++];
        unsigned int lo = offsets[u];
        unsigned int hi = offsets[u + 1];
        for (unsigned int e = lo; e < hi; ++e) {
            state ^= state >> 12;
            state ^= state << 25;
            state ^= state >> 27;
            float r = (float)((state * 2685821657736338717ULL) >> 40)
                    * (1.0f / 16777216.0f);
            unsigned int v = targets[e];
            if (r < weights[e] && !vis[v]) {
                vis[v] = 1;
                q[tail++] = v;
            }
        }
    }
}
"#;

/// Linear Threshold: one thread per sample within a [start, end) window.
///
/// `thresholds` stores the drawn value plus one, so a zeroed slab doubles
/// as the "not drawn yet" sentinel.
pub const LT_KERNEL: &str = r#"
extern "C" __global__ void lt_rr_sets(
    const unsigned int* __restrict__ offsets,
    const unsigned int* __restrict__ targets,
    const float*        __restrict__ weights,
    unsigned int n,
    unsigned int start,
    unsigned int end,
    const unsigned int*       __restrict__ roots,
    const unsigned long long* __restrict__ seeds,
    unsigned char* __restrict__ visited,     // [batch * n], zeroed by host
    unsigned int*  __restrict__ worklist,    // [batch * n]
    float*         __restrict__ thresholds,  // [batch * n], zeroed by host
    float*         __restrict__ acc)         // [batch * n], zeroed by host
{
    unsigned int s = start + blockIdx.x * blockDim.x + threadIdx.x;
    if (s >= end) return;

    unsigned char* vis = visited    + (size_t)s * n;
    unsigned int*  q   = worklist   + (size_t)s * n;
    float*         thr = thresholds + (size_t)s * n;
    float*         a   = acc        + (size_t)s * n;
    unsigned long long state = seeds[s] | 1ULL;

    unsigned int head = 0, tail = 0;
    unsigned int root = roots[s];
    vis[root] = 1;
    q[tail++] = root;

    while (head < tail) {
        unsigned int u = q[head++];
        unsigned int lo = offsets[u];
        unsigned int hi = offsets[u + 1];
        for (unsigned int e = lo; e < hi; ++e) {
            unsigned int v = targets[e];
            if (vis[v]) continue;
            if (thr[v] == 0.0f) {
                state ^= state >> 12;
                state ^= state << 25;
                state ^= state >> 27;
                float r = (float)((state * 2685821657736338717ULL) >> 40)
                        * (1.0f / 16777216.0f);
                thr[v] = 1.0f + r;
            }
            a[v] += weights[e];
            if (a[v] >= thr[v] - 1.0f) {
                vis[v] = 1;
                q[tail++] = v;
            }
        }
    }
}
"#;
